//! Package version lifecycle: the [`PackageVersions`] facade and the [`PackageVersion`] entity.

mod builder;
mod facade;
mod sources;
mod version;

pub use builder::PackageVersionsBuilder;
pub use facade::{InstallOptions, PackageVersions};
pub use version::{PackageVersion, VersionCache};
