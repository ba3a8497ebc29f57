#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{fmt::Display, str::FromStr};

use serde::Serialize;

/// Identifies one of the course projects a grader can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectId {
    /// Project one
    P1,
    /// Project two
    P2,
    /// Project three
    P3,
    /// Project four
    P4,
    /// Project five
    P5,
    /// Project six
    P6,
    /// Project seven
    P7,
    /// Project eight
    P8,
}

impl ProjectId {
    /// Every known project, in order.
    pub const ALL: [ProjectId; 8] = [
        ProjectId::P1,
        ProjectId::P2,
        ProjectId::P3,
        ProjectId::P4,
        ProjectId::P5,
        ProjectId::P6,
        ProjectId::P7,
        ProjectId::P8,
    ];

    /// Returns the lowercase identifier used on the command line and in
    /// reports, eg. `p1`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectId::P1 => "p1",
            ProjectId::P2 => "p2",
            ProjectId::P3 => "p3",
            ProjectId::P4 => "p4",
            ProjectId::P5 => "p5",
            ProjectId::P6 => "p6",
            ProjectId::P7 => "p7",
            ProjectId::P8 => "p8",
        }
    }
}

impl Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a known project.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown project `{0}`, expected one of p1-p8")]
pub struct UnknownProject(pub String);

impl FromStr for ProjectId {
    type Err = UnknownProject;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        ProjectId::ALL
            .into_iter()
            .find(|p| p.as_str() == needle)
            .ok_or_else(|| UnknownProject(s.to_string()))
    }
}
