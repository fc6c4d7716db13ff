//! Keywords of the profile format.
//!
//! Property types are matched case-insensitively, so `PROFILE`, `Profile`
//! and `profile` all equal [`PROFILE`].

use crate::string::MotString;

pub static ALIAS: MotString = MotString::from_static("alias");
pub static CONFIG: MotString = MotString::from_static("config");
pub static DEFAULT: MotString = MotString::from_static("default");
pub static ENV: MotString = MotString::from_static("env");
pub static FILE: MotString = MotString::from_static("file");
pub static INCLUDE: MotString = MotString::from_static("include");
pub static OVERRIDE: MotString = MotString::from_static("override");
pub static MERGE: MotString = MotString::from_static("merge");
pub static NONE: MotString = MotString::from_static("none");
pub static PATH: MotString = MotString::from_static("path");
pub static PREFIX: MotString = MotString::from_static("prefix");
pub static PROFILE: MotString = MotString::from_static("profile");
pub static REMOTE: MotString = MotString::from_static("remote");
pub static RENAME: MotString = MotString::from_static("rename");
pub static REPLACE: MotString = MotString::from_static("replace");
pub static REPO: MotString = MotString::from_static("repo");
pub static RESOURCE: MotString = MotString::from_static("resource");
