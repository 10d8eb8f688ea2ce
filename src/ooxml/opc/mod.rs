//! Open Packaging Conventions (OPC) support for writing packages.
//!
//! A package is assembled in two steps:
//!
//! - Part emitters register each part with a [`PathManager`] and stream its
//!   XML into the staged file.
//! - [`PackageWriter`] zips the staged files, in registration order, into
//!   the final container.
//!
//! The [`constants`] tables hold the namespace, content type and
//! relationship type URIs the emitters write.

pub mod constants;

#[cfg(feature = "xlsx")]
pub mod path_manager;
#[cfg(feature = "xlsx")]
pub mod pkgwriter;

#[cfg(feature = "xlsx")]
pub use path_manager::PathManager;
#[cfg(feature = "xlsx")]
pub use pkgwriter::PackageWriter;
