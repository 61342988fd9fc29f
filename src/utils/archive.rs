use std::{
    fs::{self, File},
    io::Read,
    path::{Component, Path, PathBuf},
};

use flate2::read::GzDecoder;
use tracing::{debug, info};

use crate::utils::errors::{EmptyResult, ResultWithError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    Tar,
    /// Not an archive: the download itself is the payload.
    Bare,
}

impl ArchiveFormat {
    pub fn detect(file_name: &str) -> Self {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            Self::TarGz
        } else if lower.ends_with(".tar") {
            Self::Tar
        } else {
            Self::Bare
        }
    }
}

pub struct ArchiveUtils {}

impl ArchiveUtils {
    /// Unpacks `artifact` into `staging_dir` and returns the staged root:
    /// the sole top-level directory if there is exactly one entry and it is
    /// a directory, `staging_dir` otherwise.
    pub fn stage(artifact: &Path, file_name: &str, staging_dir: &Path) -> ResultWithError<PathBuf> {
        fs::create_dir_all(staging_dir)?;
        let format = ArchiveFormat::detect(file_name);
        debug!("Staging {:?} as {:?} into {:?}", artifact, format, staging_dir);

        match format {
            ArchiveFormat::TarGz => {
                Self::unpack_tar(GzDecoder::new(File::open(artifact)?), staging_dir)?
            }
            ArchiveFormat::Tar => Self::unpack_tar(File::open(artifact)?, staging_dir)?,
            ArchiveFormat::Bare => {
                fs::copy(artifact, staging_dir.join(file_name))?;
            }
        }

        let root = Self::staged_root(staging_dir)?;
        info!("Staged {} into {}", file_name, root.display());
        Ok(root)
    }

    fn unpack_tar<R: Read>(reader: R, dest: &Path) -> EmptyResult {
        let mut archive = tar::Archive::new(reader);
        archive.set_preserve_permissions(true);

        for entry in archive.entries()? {
            let mut entry = entry?;
            if entry.header().entry_type().is_pax_global_extensions() {
                continue;
            }

            let raw_path = entry.path()?.into_owned();
            if Self::sanitize(&raw_path).is_none() {
                return Err(format!("Unsafe path in archive: {}", raw_path.display()).into());
            }

            entry.unpack_in(dest)?;
        }

        Ok(())
    }

    /// Normalizes an archive entry path, rejecting absolute paths and any
    /// `..` component.
    pub fn sanitize(path: &Path) -> Option<PathBuf> {
        let mut clean = PathBuf::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => clean.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        Some(clean)
    }

    fn staged_root(staging_dir: &Path) -> ResultWithError<PathBuf> {
        let entries: Vec<_> = fs::read_dir(staging_dir)?.collect::<Result<_, _>>()?;
        if let [only] = entries.as_slice()
            && only.file_type()?.is_dir()
        {
            return Ok(only.path());
        }
        Ok(staging_dir.to_path_buf())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::write_tar_gz;
    use super::*;

    #[test]
    fn detects_formats() {
        assert_eq!(ArchiveFormat::detect("v1.0.0.tar.gz"), ArchiveFormat::TarGz);
        assert_eq!(ArchiveFormat::detect("tool.TGZ"), ArchiveFormat::TarGz);
        assert_eq!(ArchiveFormat::detect("tool.tar"), ArchiveFormat::Tar);
        assert_eq!(ArchiveFormat::detect("create_flutter_app.sh"), ArchiveFormat::Bare);
    }

    #[test]
    fn descends_into_sole_top_level_directory() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("v1.0.0.tar.gz");
        write_tar_gz(
            &artifact,
            &[
                ("tools-1.0.0/bin/create_flutter_app", b"#!/bin/sh\n", 0o755),
                ("tools-1.0.0/README.md", b"readme", 0o644),
            ],
        );

        let staging = dir.path().join("staging");
        let root = ArchiveUtils::stage(&artifact, "v1.0.0.tar.gz", &staging).unwrap();
        assert_eq!(root, staging.join("tools-1.0.0"));
        assert!(root.join("bin/create_flutter_app").is_file());
    }

    #[test]
    fn keeps_staging_dir_as_root_for_flat_archives() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("flat.tar.gz");
        write_tar_gz(
            &artifact,
            &[
                ("create_flutter_app.sh", b"#!/bin/sh\n", 0o755),
                ("LICENSE", b"MIT", 0o644),
            ],
        );

        let staging = dir.path().join("staging");
        let root = ArchiveUtils::stage(&artifact, "flat.tar.gz", &staging).unwrap();
        assert_eq!(root, staging);
        assert!(root.join("create_flutter_app.sh").is_file());
    }

    #[test]
    fn lone_bin_directory_becomes_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("v1.0.0.tar.gz");
        write_tar_gz(&artifact, &[("bin/create_flutter_app", b"#!/bin/sh\n", 0o755)]);

        let staging = dir.path().join("staging");
        let root = ArchiveUtils::stage(&artifact, "v1.0.0.tar.gz", &staging).unwrap();
        assert_eq!(root, staging.join("bin"));
        assert!(root.join("create_flutter_app").is_file());
    }

    #[test]
    fn stages_bare_files_under_their_name() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("download");
        fs::write(&artifact, b"#!/bin/sh\n").unwrap();

        let staging = dir.path().join("staging");
        let root = ArchiveUtils::stage(&artifact, "create_flutter_app.sh", &staging).unwrap();
        assert_eq!(root, staging);
        assert!(staging.join("create_flutter_app.sh").is_file());
    }

    #[test]
    fn sanitize_rejects_escapes() {
        assert_eq!(
            ArchiveUtils::sanitize(Path::new("./a/b")),
            Some(PathBuf::from("a/b"))
        );
        assert_eq!(ArchiveUtils::sanitize(Path::new("a/../../etc/passwd")), None);
        assert_eq!(ArchiveUtils::sanitize(Path::new("/etc/passwd")), None);
    }
}
