// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use campus_records::{
    export_snapshot_json, import_courses, import_enrollments, import_students, load_data_dir,
    save_data_dir, BackupService, Config, Course, CourseIdentifier, CourseOrder, CourseRegistry,
    Grade, Name, RecordsError, Semester, Student, StudentOrder, StudentRegistry, StudentStatus,
    TranscriptEngine,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Campus course and records manager
#[derive(Parser)]
#[command(name = "ccrm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON config file (defaults to ./ccrm.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override the backup directory
    #[arg(long, global = true)]
    backup_dir: Option<PathBuf>,

    /// Debug logging (RUST_LOG still wins when set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Counts of students, courses and grades
    Summary,

    /// List students
    Students {
        /// name, regno, date or enrolled
        #[arg(long, default_value = "name")]
        sort: StudentOrder,

        /// Case-insensitive match on name, regno or id
        #[arg(long)]
        search: Option<String>,
    },

    /// List courses
    Courses {
        #[arg(long)]
        search: Option<String>,

        #[arg(long)]
        instructor: Option<String>,

        #[arg(long)]
        department: Option<String>,

        /// SPRING, SUMMER, FALL or WINTER
        #[arg(long)]
        semester: Option<Semester>,

        /// code, title, credits, department, instructor or department-code
        #[arg(long, default_value = "code")]
        sort: CourseOrder,
    },

    /// Print a student's transcript
    Transcript {
        student_id: String,
    },

    /// Highest-GPA students
    Top {
        #[arg(default_value_t = 5)]
        count: usize,
    },

    /// Average GPA per performance band
    Distribution,

    /// Rewrite the CSV files in the data directory
    Export {
        /// Also write a JSON snapshot here
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Manage backups of the data directory
    Backup {
        #[command(subcommand)]
        action: BackupAction,
    },

    /// Browse records in the terminal
    Tui,

    #[command(flatten)]
    Change(Change),
}

/// Commands that modify records and write the data directory back
#[derive(Subcommand)]
enum Change {
    /// Add, update or deactivate a student
    Student {
        #[command(subcommand)]
        action: StudentAction,
    },

    /// Add, update or deactivate a course
    Course {
        #[command(subcommand)]
        action: CourseAction,
    },

    /// Enroll a student in a course
    Enroll {
        student_id: String,
        course_code: String,
    },

    /// Drop a course, together with any grade recorded for it
    Unenroll {
        student_id: String,
        course_code: String,
    },

    /// Record (or overwrite) a grade: S, A, B, C, D, E or F
    Grade {
        student_id: String,
        course_code: String,
        grade: Grade,
    },

    /// Add the records of a CSV file to the data directory
    Import {
        kind: ImportKind,
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum StudentAction {
    Add {
        id: String,
        #[arg(long)]
        regno: String,
        #[arg(long)]
        first: String,
        #[arg(long)]
        last: String,
        #[arg(long)]
        email: String,
    },
    Update {
        id: String,
        #[arg(long)]
        first: Option<String>,
        #[arg(long)]
        last: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        regno: Option<String>,
        /// ACTIVE, INACTIVE, GRADUATED or SUSPENDED
        #[arg(long)]
        status: Option<StudentStatus>,
    },
    Deactivate {
        id: String,
    },
}

#[derive(Subcommand)]
enum CourseAction {
    Add {
        code: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        credits: i32,
        #[arg(long)]
        instructor: String,
        #[arg(long)]
        semester: Semester,
        #[arg(long)]
        department: String,
    },
    Update {
        code: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        credits: Option<i32>,
        #[arg(long)]
        instructor: Option<String>,
        #[arg(long)]
        semester: Option<Semester>,
        #[arg(long)]
        department: Option<String>,
    },
    Deactivate {
        code: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ImportKind {
    Students,
    Courses,
    Enrollments,
}

#[derive(Subcommand)]
enum BackupAction {
    Create,
    List,
    Clean {
        /// Backups to keep (defaults to keep_backups from config)
        #[arg(long)]
        keep: Option<usize>,
    },
    Restore {
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(dir) = cli.backup_dir {
        config.backup_dir = dir;
    }

    match cli.command {
        Commands::Backup { action } => run_backup(&config, action),
        Commands::Change(change) => {
            println!("{}", run_change(&config, change)?);
            Ok(())
        }
        command => {
            let (students, courses) = load_data_dir(&config)
                .with_context(|| format!("Failed to load data from {:?}", config.data_dir))?;
            run_records(&config, command, &students, &courses)
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn run_records(
    config: &Config,
    command: Commands,
    students: &StudentRegistry,
    courses: &CourseRegistry,
) -> Result<()> {
    let engine = TranscriptEngine::new(students, courses);

    match command {
        Commands::Summary => {
            let all = students.all();
            let active = all.iter().filter(|s| s.is_active()).count();
            let enrollments: usize = all.iter().map(|s| s.total_enrolled()).sum();
            let graded = all.iter().filter(|s| s.has_grades()).count();

            println!("📊 Campus Records");
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            println!("Students:     {} ({} active)", all.len(), active);
            println!("Courses:      {}", courses.len());
            println!("Enrollments:  {}", enrollments);
            println!("Graded:       {} students", graded);
        }

        Commands::Students { sort, search } => {
            let mut list = match search {
                Some(q) => students.search(&q),
                None => students.all(),
            };
            list.sort_by(|a, b| sort.compare(a, b));

            for s in &list {
                let gpa = engine.gpa(s.id())?;
                println!(
                    "{:<8} {:<12} {:<28} {:<10} {:>2} courses  GPA {:.2}",
                    s.id(),
                    s.regno(),
                    s.name().full_name(),
                    s.status().as_str(),
                    s.total_enrolled(),
                    gpa
                );
            }
            println!("\n{} student(s)", list.len());
        }

        Commands::Courses {
            search,
            instructor,
            department,
            semester,
            sort,
        } => {
            let filter = CourseFilter {
                search,
                instructor,
                department,
                semester,
            };
            let mut list = filter.apply(courses);
            list.sort_by(|a, b| sort.compare(a, b));

            for c in &list {
                println!(
                    "{:<9} {:<32} {:>2} cr  {:<20} {:<8} {}",
                    c.code().as_str(),
                    c.title(),
                    c.credits(),
                    c.instructor(),
                    c.semester().as_str(),
                    c.department()
                );
            }
            println!("\n{} course(s)", list.len());
        }

        Commands::Transcript { student_id } => {
            print!("{}", engine.transcript_text(&student_id)?);
        }

        Commands::Top { count } => {
            for (rank, (student, gpa)) in engine.ranking().into_iter().take(count).enumerate() {
                println!(
                    "{:>2}. {:<28} {:<12} {:.2}",
                    rank + 1,
                    student.name().full_name(),
                    student.regno(),
                    gpa
                );
            }
        }

        Commands::Distribution => {
            println!("📈 GPA Distribution");
            for (band, average) in engine.gpa_distribution() {
                println!("  {:<22} {:.2}", band.label(), average);
            }
        }

        Commands::Export { json } => {
            save_data_dir(config, students, courses)?;
            println!("✓ Data written to {:?}", config.data_dir);
            if let Some(path) = json {
                export_snapshot_json(&path, &students.all(), &courses.all())?;
                println!("✓ Snapshot written to {:?}", path);
            }
        }

        Commands::Tui => run_ui_mode(students, courses)?,

        Commands::Backup { action } => run_backup(config, action)?,

        Commands::Change(change) => println!("{}", commit_change(config, change, students, courses)?),
    }

    Ok(())
}

struct CourseFilter {
    search: Option<String>,
    instructor: Option<String>,
    department: Option<String>,
    semester: Option<Semester>,
}

impl CourseFilter {
    /// Courses passing every given filter, in registry order.
    fn apply(&self, courses: &CourseRegistry) -> Vec<Course> {
        let mut list = match &self.search {
            Some(q) => courses.search(q),
            None => courses.all(),
        };
        if let Some(name) = &self.instructor {
            keep_only(&mut list, courses.find_by_instructor(name));
        }
        if let Some(dept) = &self.department {
            keep_only(&mut list, courses.find_by_department(dept));
        }
        if let Some(sem) = self.semester {
            keep_only(&mut list, courses.find_by_semester(sem));
        }
        list
    }
}

fn keep_only(list: &mut Vec<Course>, matches: Vec<Course>) {
    let codes: HashSet<CourseIdentifier> = matches.into_iter().map(|c| c.code().clone()).collect();
    list.retain(|c| codes.contains(c.code()));
}

// ============================================================================
// RECORD CHANGES
// ============================================================================

/// Load the data directory, apply one change, write everything back.
fn run_change(config: &Config, change: Change) -> Result<String> {
    let (students, courses) = load_data_dir(config)
        .with_context(|| format!("Failed to load data from {:?}", config.data_dir))?;
    commit_change(config, change, &students, &courses)
}

/// Nothing is written unless the whole change succeeds.
fn commit_change(
    config: &Config,
    change: Change,
    students: &StudentRegistry,
    courses: &CourseRegistry,
) -> Result<String> {
    let message = apply_change(change, students, courses)?;
    save_data_dir(config, students, courses)?;
    Ok(message)
}

fn apply_change(change: Change, students: &StudentRegistry, courses: &CourseRegistry) -> Result<String> {
    match change {
        Change::Student { action } => apply_student(action, students),
        Change::Course { action } => apply_course(action, courses),

        Change::Enroll {
            student_id,
            course_code,
        } => {
            let course = find_course(courses, &course_code)?;
            students.enroll(&student_id, &course)?;
            Ok(format!("✓ {} enrolled in {}", student_id, course.code()))
        }

        Change::Unenroll {
            student_id,
            course_code,
        } => {
            let course = find_course(courses, &course_code)?;
            students.unenroll(&student_id, &course)?;
            Ok(format!("✓ {} unenrolled from {}", student_id, course.code()))
        }

        Change::Grade {
            student_id,
            course_code,
            grade,
        } => {
            TranscriptEngine::new(students, courses).record_grade(&student_id, &course_code, grade)?;
            Ok(format!("✓ {} graded {} in {}", student_id, grade.letter(), course_code.trim().to_uppercase()))
        }

        Change::Import { kind, path } => {
            let count = match kind {
                ImportKind::Students => {
                    let imported = import_students(&path)?;
                    let count = imported.len();
                    for student in imported {
                        students
                            .add(student)
                            .with_context(|| format!("Failed to import {:?}", path))?;
                    }
                    count
                }
                ImportKind::Courses => {
                    let imported = import_courses(&path)?;
                    let count = imported.len();
                    for course in imported {
                        courses
                            .add(course)
                            .with_context(|| format!("Failed to import {:?}", path))?;
                    }
                    count
                }
                ImportKind::Enrollments => import_enrollments(&path, students, courses)?,
            };
            Ok(format!("✓ Imported {} record(s) from {:?}", count, path))
        }
    }
}

fn apply_student(action: StudentAction, students: &StudentRegistry) -> Result<String> {
    match action {
        StudentAction::Add {
            id,
            regno,
            first,
            last,
            email,
        } => {
            let student = Student::new(&id, Name::new(&first, &last)?, &email, &regno)?;
            students.add(student)?;
            Ok(format!("✓ Student {} added", id.trim()))
        }

        StudentAction::Update {
            id,
            first,
            last,
            email,
            regno,
            status,
        } => {
            let current = find_student(students, &id)?;
            if first.is_some() || last.is_some() || email.is_some() {
                let name = Name::new(
                    first.as_deref().unwrap_or(current.name().first()),
                    last.as_deref().unwrap_or(current.name().last()),
                )?;
                students.update_contact(&id, name, email.as_deref().unwrap_or(current.email()))?;
            }
            if let Some(regno) = regno {
                students.rename_regno(&id, &regno)?;
            }
            if let Some(status) = status {
                students.set_status(&id, status)?;
            }
            Ok(format!("✓ Student {} updated", id))
        }

        StudentAction::Deactivate { id } => {
            find_student(students, &id)?;
            students.deactivate(&id);
            Ok(format!("✓ Student {} deactivated", id))
        }
    }
}

fn apply_course(action: CourseAction, courses: &CourseRegistry) -> Result<String> {
    match action {
        CourseAction::Add {
            code,
            title,
            credits,
            instructor,
            semester,
            department,
        } => {
            let course = Course::builder(CourseIdentifier::new(&code)?, &title)
                .credits(credits)
                .instructor(&instructor)
                .semester(semester)
                .department(&department)
                .build()?;
            let code = course.code().clone();
            courses.add(course)?;
            Ok(format!("✓ Course {} added", code))
        }

        CourseAction::Update {
            code,
            title,
            credits,
            instructor,
            semester,
            department,
        } => {
            let updated = courses.update(&code, |course| {
                if let Some(title) = &title {
                    course.set_title(title)?;
                }
                if let Some(credits) = credits {
                    course.set_credits(credits)?;
                }
                if let Some(instructor) = &instructor {
                    course.set_instructor(instructor)?;
                }
                if let Some(semester) = semester {
                    course.set_semester(semester);
                }
                if let Some(department) = &department {
                    course.set_department(department)?;
                }
                Ok(())
            })?;
            Ok(format!("✓ Course {} updated", updated.code()))
        }

        CourseAction::Deactivate { code } => {
            let course = find_course(courses, &code)?;
            courses.deactivate(course.code().as_str());
            Ok(format!("✓ Course {} deactivated", course.code()))
        }
    }
}

fn find_student(students: &StudentRegistry, id: &str) -> Result<Student, RecordsError> {
    students
        .find_by_id(id)
        .ok_or_else(|| RecordsError::not_found("Student", id))
}

fn find_course(courses: &CourseRegistry, code: &str) -> Result<Course, RecordsError> {
    courses
        .find_by_id(code)
        .ok_or_else(|| RecordsError::not_found("Course", code.trim()))
}

fn run_backup(config: &Config, action: BackupAction) -> Result<()> {
    let service = BackupService::new(config);

    match action {
        BackupAction::Create => {
            let path = service.create_backup()?;
            println!("✓ Backup created at {:?}", path);
        }
        BackupAction::List => {
            let backups = service.list_backups()?;
            if backups.is_empty() {
                println!("No backups found.");
            }
            for backup in backups {
                println!("{:<36} {:>10} bytes", backup.name, backup.size);
            }
        }
        BackupAction::Clean { keep } => {
            let removed = service.clean_old_backups(keep.unwrap_or(config.keep_backups))?;
            println!("✓ Removed {} old backup(s)", removed);
        }
        BackupAction::Restore { path } => {
            service.restore(&path)?;
            println!("✓ Data restored from {:?}", path);
        }
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(students: &StudentRegistry, courses: &CourseRegistry) -> Result<()> {
    let mut app = ui::App::new(students, courses);
    ui::run_ui(&mut app)
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_students: &StudentRegistry, _courses: &CourseRegistry) -> Result<()> {
    anyhow::bail!("TUI mode not available; rebuild with --features tui")
}
