//! File size and count limits

use athenaeum_core::constants::{MAX_FILES_PER_RESOURCE, MAX_FILE_SIZE_BYTES};
use athenaeum_core::models::PendingFile;
use athenaeum_core::{ClientConfig, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileQuota {
    pub max_file_size: u64,
    pub max_files: usize,
}

impl Default for FileQuota {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE_BYTES,
            max_files: MAX_FILES_PER_RESOURCE,
        }
    }
}

/// Outcome of adding files to a selection.
#[derive(Debug, Clone, Default)]
pub struct Admission {
    /// Files that fit, in the order they were offered.
    pub accepted: Vec<PendingFile>,
    /// Oversize files, one `FileTooLarge` each.
    pub rejected: Vec<ValidationError>,
    /// Files that were within the size limit but over the count quota.
    pub dropped: usize,
}

impl Admission {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty() && self.dropped == 0
    }
}

impl FileQuota {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            max_file_size: config.max_file_size_bytes,
            max_files: config.max_files_per_resource,
        }
    }

    fn oversize(&self, file: &PendingFile) -> Option<ValidationError> {
        (file.size > self.max_file_size).then(|| ValidationError::FileTooLarge {
            name: file.name.clone(),
            size: file.size,
            limit: self.max_file_size,
        })
    }

    /// Split `incoming` into what fits next to `existing` already selected files.
    pub fn admit(&self, existing: usize, incoming: Vec<PendingFile>) -> Admission {
        let mut admission = Admission::default();
        let mut room = self.max_files.saturating_sub(existing);

        for file in incoming {
            if let Some(err) = self.oversize(&file) {
                admission.rejected.push(err);
            } else if room > 0 {
                room -= 1;
                admission.accepted.push(file);
            } else {
                admission.dropped += 1;
            }
        }

        admission
    }

    /// Submit-time re-check of the whole selection.
    pub fn check_batch(&self, files: &[PendingFile]) -> Result<(), ValidationError> {
        if files.is_empty() {
            return Err(ValidationError::NoFiles);
        }
        if files.len() > self.max_files {
            return Err(ValidationError::TooManyFiles {
                count: files.len(),
                limit: self.max_files,
            });
        }
        match files.iter().find_map(|f| self.oversize(f)) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn files(n: usize) -> Vec<PendingFile> {
        (0..n)
            .map(|i| {
                PendingFile::from_bytes(format!("f{}.pdf", i), "application/pdf", Bytes::from("x"))
            })
            .collect()
    }

    #[test]
    fn keeps_twenty_of_twenty_five() {
        let admission = FileQuota::default().admit(0, files(25));
        assert_eq!(admission.accepted.len(), 20);
        assert_eq!(admission.dropped, 5);
        assert_eq!(admission.accepted[19].name, "f19.pdf");
    }

    #[test]
    fn fills_only_the_remaining_room() {
        let admission = FileQuota::default().admit(18, files(5));
        let names: Vec<_> = admission.accepted.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["f0.pdf", "f1.pdf"]);
        assert_eq!(admission.dropped, 3);
    }

    #[test]
    fn oversize_files_are_reported_not_counted() {
        let quota = FileQuota {
            max_file_size: 4,
            max_files: 2,
        };
        let incoming = vec![
            PendingFile::from_bytes("big.zip", "application/zip", Bytes::from("0123456789")),
            PendingFile::from_bytes("a.txt", "text/plain", Bytes::from("a")),
            PendingFile::from_bytes("b.txt", "text/plain", Bytes::from("b")),
        ];

        let admission = quota.admit(0, incoming);

        assert_eq!(admission.accepted.len(), 2);
        assert_eq!(admission.dropped, 0);
        assert_eq!(
            admission.rejected,
            vec![ValidationError::FileTooLarge {
                name: "big.zip".to_string(),
                size: 10,
                limit: 4,
            }]
        );
        assert!(!admission.is_clean());
    }

    #[test]
    fn check_batch_rejects_empty_and_oversized_selections() {
        let quota = FileQuota {
            max_file_size: 4,
            max_files: 2,
        };
        assert_eq!(quota.check_batch(&[]), Err(ValidationError::NoFiles));
        assert_eq!(
            quota.check_batch(&files(3)),
            Err(ValidationError::TooManyFiles { count: 3, limit: 2 })
        );
        let big = PendingFile::from_bytes("big.bin", "application/octet-stream", Bytes::from("12345"));
        assert!(matches!(
            quota.check_batch(&[big]),
            Err(ValidationError::FileTooLarge { .. })
        ));
        assert!(quota.check_batch(&files(2)).is_ok());
    }
}
