use athenaeum_core::models::{Category, Department, PendingFile, ResourceDraft};
use bytes::Bytes;

pub fn draft(title: &str) -> ResourceDraft {
    ResourceDraft::new(title, "Weekly course material")
        .with_category(Category::LectureNotes)
        .with_department(Department::ComputerScience)
}

pub fn file(name: &str) -> PendingFile {
    PendingFile::from_bytes(name, "application/pdf", Bytes::from(format!("content of {}", name)))
}

pub fn file_of_size(name: &str, size: usize) -> PendingFile {
    PendingFile::from_bytes(name, "application/pdf", Bytes::from(vec![0u8; size]))
}

pub fn files(names: &[&str]) -> Vec<PendingFile> {
    names.iter().map(|n| file(n)).collect()
}

pub fn url_for(name: &str) -> String {
    format!("https://cdn.test/resources/{}", name)
}
