// Campus Records - Core Library
// Exposes all modules for use in the CLI, the TUI browser, and tests

pub mod error;
pub mod values;
pub mod entities;
pub mod sorting;
pub mod transcript;
pub mod config;
pub mod import_export;
pub mod backup;

// Re-export commonly used types
pub use error::{ErrorKind, RecordsError};
pub use values::{CourseIdentifier, Name};
pub use entities::{
    Course, CourseBuilder, CourseRegistry,
    Grade, Semester,
    Instructor,
    Person, Profile,
    Student, StudentRegistry, StudentStatus,
};
pub use sorting::{CourseOrder, StudentOrder};
pub use transcript::{GpaBand, TranscriptEngine};
pub use config::Config;
pub use import_export::{
    import_students, import_courses, import_enrollments,
    export_students, export_courses, export_enrollments,
    export_snapshot_json, load_data_dir, save_data_dir,
};
pub use backup::{directory_size, BackupInfo, BackupService};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
