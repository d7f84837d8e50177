// 📥 Import / Export - CSV files in, CSV and JSON snapshots out
//
// Rows are parsed with serde like any other CSV record, then turned into
// validated entities. A bad row stops the import and names its line.
// Registries are only touched through their public operations.

use crate::config::Config;
use crate::entities::course::{Course, CourseRegistry};
use crate::entities::grade::{Grade, Semester};
use crate::entities::student::{Student, StudentRegistry, StudentStatus};
use crate::transcript::TranscriptEngine;
use crate::values::{CourseIdentifier, Name};
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// CSV ROWS
// ============================================================================

#[derive(Debug, Deserialize)]
struct StudentRow {
    #[serde(rename = "ID")]
    id: String,

    #[serde(rename = "RegNo")]
    regno: String,

    #[serde(rename = "Name")]
    name: String,

    #[serde(rename = "Email")]
    email: String,

    #[serde(rename = "Status", default)]
    status: Option<String>,

    #[serde(rename = "CreatedDate", default)]
    created_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CourseRow {
    #[serde(rename = "Code")]
    code: String,

    #[serde(rename = "Title")]
    title: String,

    #[serde(rename = "Credits")]
    credits: i32,

    #[serde(rename = "Instructor")]
    instructor: String,

    #[serde(rename = "Semester")]
    semester: String,

    #[serde(rename = "Department")]
    department: String,

    #[serde(rename = "CreatedDate", default)]
    created_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EnrollmentRow {
    #[serde(rename = "StudentID")]
    student_id: String,

    #[serde(rename = "CourseCode")]
    course_code: String,

    #[serde(rename = "Grade", default)]
    grade: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", raw.trim()))
}

impl StudentRow {
    fn into_student(self) -> Result<Student> {
        let name = Name::parse_full(&self.name)?;
        let mut student = Student::new(&self.id, name, &self.email, &self.regno)?;

        if let Some(status) = non_blank(self.status) {
            student = student.with_status(status.parse::<StudentStatus>()?);
        }
        if let Some(date) = non_blank(self.created_date) {
            student = student.with_created_on(parse_date(&date)?);
        }
        Ok(student)
    }
}

impl CourseRow {
    fn into_course(self) -> Result<Course> {
        let code = CourseIdentifier::new(&self.code)?;
        let semester: Semester = self.semester.parse()?;

        let mut course = Course::builder(code, &self.title)
            .credits(self.credits)
            .instructor(&self.instructor)
            .semester(semester)
            .department(&self.department)
            .build()?;

        if let Some(date) = non_blank(self.created_date) {
            course = course.with_created_on(parse_date(&date)?);
        }
        Ok(course)
    }
}

fn reader(path: &Path) -> Result<csv::Reader<fs::File>> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path))
}

fn writer(path: &Path) -> Result<csv::Writer<fs::File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }
    csv::Writer::from_path(path).with_context(|| format!("Failed to create CSV file: {:?}", path))
}

// ============================================================================
// IMPORT
// ============================================================================

/// Deserialize every data row, paired with the file line it starts on.
///
/// Line numbers come from the reader, so skipped blank lines still count.
fn read_rows<T: DeserializeOwned>(path: &Path, kind: &str) -> Result<Vec<(u64, T)>> {
    let mut rdr = reader(path)?;
    let headers = rdr
        .headers()
        .with_context(|| format!("Failed to read CSV header: {:?}", path))?
        .clone();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.with_context(|| format!("Failed to read {} record", kind))?;
        let line = record.position().map_or(0, |p| p.line());
        let row = record
            .deserialize(Some(&headers))
            .with_context(|| format!("Failed to read {} record at line {}", kind, line))?;
        rows.push((line, row));
    }
    Ok(rows)
}

/// Read students from `ID,RegNo,Name,Email[,Status,CreatedDate]`.
pub fn import_students(path: &Path) -> Result<Vec<Student>> {
    let mut students = Vec::new();

    for (line, row) in read_rows::<StudentRow>(path, "student")? {
        let student = row
            .into_student()
            .with_context(|| format!("Invalid student record at line {}", line))?;
        students.push(student);
    }

    info!(count = students.len(), path = ?path, "students imported");
    Ok(students)
}

/// Read courses from `Code,Title,Credits,Instructor,Semester,Department[,CreatedDate]`.
pub fn import_courses(path: &Path) -> Result<Vec<Course>> {
    let mut courses = Vec::new();

    for (line, row) in read_rows::<CourseRow>(path, "course")? {
        let course = row
            .into_course()
            .with_context(|| format!("Invalid course record at line {}", line))?;
        courses.push(course);
    }

    info!(count = courses.len(), path = ?path, "courses imported");
    Ok(courses)
}

/// Replay an enrollments export: enroll each student (if needed) and record the grade.
///
/// Returns the number of grades recorded.
pub fn import_enrollments(
    path: &Path,
    students: &StudentRegistry,
    courses: &CourseRegistry,
) -> Result<usize> {
    let engine = TranscriptEngine::new(students, courses);
    let mut recorded = 0;

    for (line, row) in read_rows::<EnrollmentRow>(path, "enrollment")? {
        let grade: Option<Grade> = non_blank(row.grade)
            .map(|g| g.parse())
            .transpose()
            .with_context(|| format!("Invalid enrollment record at line {}", line))?;
        let course = courses
            .find_by_id(&row.course_code)
            .ok_or_else(|| anyhow!("Unknown course '{}' at line {}", row.course_code, line))?;
        let student = students
            .find_by_id(&row.student_id)
            .ok_or_else(|| anyhow!("Unknown student '{}' at line {}", row.student_id, line))?;

        if !student.is_enrolled(course.code()) {
            students.enroll(student.id(), &course)?;
        }
        // blank grade: enrolled, not yet graded
        if let Some(grade) = grade {
            engine
                .record_grade(student.id(), course.code().as_str(), grade)
                .with_context(|| format!("Invalid enrollment record at line {}", line))?;
        }
        recorded += 1;
    }

    info!(count = recorded, path = ?path, "enrollments imported");
    Ok(recorded)
}

// ============================================================================
// EXPORT
// ============================================================================

pub fn export_students(path: &Path, students: &[Student]) -> Result<usize> {
    let mut wtr = writer(path)?;
    wtr.write_record(["ID", "RegNo", "Name", "Email", "Status", "CreatedDate"])?;

    for student in students {
        wtr.write_record([
            student.id(),
            student.regno(),
            student.name().full_name().as_str(),
            student.email(),
            student.status().as_str(),
            student.profile().created_on().format(DATE_FORMAT).to_string().as_str(),
        ])?;
    }

    wtr.flush()
        .with_context(|| format!("Failed to write CSV file: {:?}", path))?;
    info!(count = students.len(), path = ?path, "students exported");
    Ok(students.len())
}

pub fn export_courses(path: &Path, courses: &[Course]) -> Result<usize> {
    let mut wtr = writer(path)?;
    wtr.write_record([
        "Code",
        "Title",
        "Credits",
        "Instructor",
        "Semester",
        "Department",
        "CreatedDate",
    ])?;

    for course in courses {
        wtr.write_record([
            course.code().as_str(),
            course.title(),
            course.credits().to_string().as_str(),
            course.instructor(),
            course.semester().as_str(),
            course.department(),
            course.created_on().format(DATE_FORMAT).to_string().as_str(),
        ])?;
    }

    wtr.flush()
        .with_context(|| format!("Failed to write CSV file: {:?}", path))?;
    info!(count = courses.len(), path = ?path, "courses exported");
    Ok(courses.len())
}

/// One row per graded course; ungraded enrollments are not exported.
pub fn export_enrollments(
    path: &Path,
    students: &[Student],
    courses: &CourseRegistry,
) -> Result<usize> {
    write_enrollments(path, students, courses, false)
}

/// With `include_ungraded`, enrolled courses without a grade get a row with blank
/// Grade and GradePoints.
fn write_enrollments(
    path: &Path,
    students: &[Student],
    courses: &CourseRegistry,
    include_ungraded: bool,
) -> Result<usize> {
    let mut wtr = writer(path)?;
    wtr.write_record([
        "StudentID",
        "StudentName",
        "CourseCode",
        "CourseTitle",
        "Grade",
        "GradePoints",
    ])?;

    let mut rows = 0;
    for student in students {
        let full_name = student.name().full_name();
        let codes = if include_ungraded {
            student.enrolled_courses()
        } else {
            student.grades().into_keys().collect()
        };
        for code in codes {
            let title = courses
                .get(&code)
                .map(|c| c.title().to_string())
                .unwrap_or_default();
            let (letter, points) = match student.grade_for(&code) {
                Some(grade) => (grade.letter(), format!("{:.1}", grade.points())),
                None => ("", String::new()),
            };
            wtr.write_record([
                student.id(),
                full_name.as_str(),
                code.as_str(),
                title.as_str(),
                letter,
                points.as_str(),
            ])?;
            rows += 1;
        }
    }

    wtr.flush()
        .with_context(|| format!("Failed to write CSV file: {:?}", path))?;
    info!(count = rows, path = ?path, "enrollments exported");
    Ok(rows)
}

#[derive(Serialize)]
struct Snapshot<'a> {
    exported_at: DateTime<Utc>,
    students: &'a [Student],
    courses: &'a [Course],
}

/// Write both registries as one pretty-printed JSON document.
pub fn export_snapshot_json(path: &Path, students: &[Student], courses: &[Course]) -> Result<()> {
    let snapshot = Snapshot {
        exported_at: Utc::now(),
        students,
        courses,
    };
    let json = serde_json::to_string_pretty(&snapshot).context("Failed to serialize snapshot")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }
    fs::write(path, json).with_context(|| format!("Failed to write snapshot: {:?}", path))?;

    info!(path = ?path, "snapshot exported");
    Ok(())
}

// ============================================================================
// DATA DIRECTORY
// ============================================================================

/// Build fresh registries from the configured data directory.
///
/// Missing files count as empty; duplicates or bad rows are errors.
pub fn load_data_dir(config: &Config) -> Result<(StudentRegistry, CourseRegistry)> {
    let students = StudentRegistry::new();
    let courses = CourseRegistry::new();

    let courses_path = config.courses_path();
    if courses_path.is_file() {
        for course in import_courses(&courses_path)? {
            courses
                .add(course)
                .with_context(|| format!("Failed to load {:?}", courses_path))?;
        }
    }

    let students_path = config.students_path();
    if students_path.is_file() {
        for student in import_students(&students_path)? {
            students
                .add(student)
                .with_context(|| format!("Failed to load {:?}", students_path))?;
        }
    }

    let enrollments_path = config.enrollments_path();
    if enrollments_path.is_file() {
        import_enrollments(&enrollments_path, &students, &courses)?;
    }

    Ok((students, courses))
}

/// Write all three CSV files into the configured data directory.
///
/// Unlike `export_enrollments`, the enrollments file keeps ungraded enrollments.
pub fn save_data_dir(
    config: &Config,
    students: &StudentRegistry,
    courses: &CourseRegistry,
) -> Result<()> {
    let all_students = students.all();
    export_students(&config.students_path(), &all_students)?;
    export_courses(&config.courses_path(), &courses.all())?;
    write_enrollments(&config.enrollments_path(), &all_students, courses, true)?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, RecordsError};
    use tempfile::TempDir;

    const STUDENTS_CSV: &str = "\
ID,RegNo,Name,Email
S001,REG-001,Ada Lovelace,ada@example.edu

S002,REG-002,Alan Mathison Turing,alan@example.edu
";

    const COURSES_CSV: &str = "\
Code,Title,Credits,Instructor,Semester,Department
cs101,Intro to Programming,3,Alan Turing,FALL,Computer Science
MATH201,Linear Algebra,4,Emmy Noether,Spring Semester,Math
";

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn config_for(dir: &TempDir) -> Config {
        Config {
            data_dir: dir.path().join("data"),
            backup_dir: dir.path().join("backups"),
            ..Config::default()
        }
    }

    #[test]
    fn test_import_students() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "students.csv", STUDENTS_CSV);

        let students = import_students(&path).unwrap();
        assert_eq!(students.len(), 2);
        assert_eq!(students[0].id(), "S001");
        assert_eq!(students[0].status(), StudentStatus::Active);
        assert_eq!(students[1].name().first(), "Alan");
        assert_eq!(students[1].name().last(), "Mathison Turing");
    }

    #[test]
    fn test_import_students_rejects_single_word_name() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "students.csv",
            "ID,RegNo,Name,Email\nS001,REG-001,Ada Lovelace,a@x.edu\nS002,REG-002,Cher,c@x.edu\n",
        );

        let err = import_students(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("line 3"));
        let cause = err.downcast_ref::<RecordsError>().unwrap();
        assert_eq!(cause.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_import_error_line_counts_blank_lines() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "courses.csv",
            "Code,Title,Credits,Instructor,Semester,Department\nCS101,Intro,3,Turing,FALL,CS\n\n\nMATH201,Algebra,0,Noether,SPRING,Math\n",
        );

        let err = import_courses(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("at line 5"));
    }

    #[test]
    fn test_import_courses() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "courses.csv", COURSES_CSV);

        let courses = import_courses(&path).unwrap();
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].code().as_str(), "CS101");
        assert_eq!(courses[0].semester(), Semester::Fall);
        assert_eq!(courses[1].semester(), Semester::Spring);
        assert_eq!(courses[1].credits(), 4);
    }

    #[test]
    fn test_import_courses_rejects_bad_rows() {
        let dir = TempDir::new().unwrap();

        let bad_code = write(
            &dir,
            "a.csv",
            "Code,Title,Credits,Instructor,Semester,Department\nC1,Intro,3,T,FALL,CS\n",
        );
        assert!(import_courses(&bad_code).is_err());

        let zero_credits = write(
            &dir,
            "b.csv",
            "Code,Title,Credits,Instructor,Semester,Department\nCS101,Intro,0,T,FALL,CS\n",
        );
        assert!(import_courses(&zero_credits).is_err());

        let not_a_number = write(
            &dir,
            "c.csv",
            "Code,Title,Credits,Instructor,Semester,Department\nCS101,Intro,three,T,FALL,CS\n",
        );
        assert!(import_courses(&not_a_number).is_err());
    }

    #[test]
    fn test_import_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(import_students(&dir.path().join("missing.csv")).is_err());
    }

    #[test]
    fn test_export_students_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("students.csv");
        let created = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        let students = vec![Student::new(
            "S001",
            Name::new("Ada", "Lovelace").unwrap(),
            "ada@example.edu",
            "REG-001",
        )
        .unwrap()
        .with_created_on(created)
        .with_status(StudentStatus::Graduated)];

        assert_eq!(export_students(&path, &students).unwrap(), 1);
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "ID,RegNo,Name,Email,Status,CreatedDate\nS001,REG-001,Ada Lovelace,ada@example.edu,GRADUATED,2024-09-01\n"
        );
    }

    #[test]
    fn test_export_quotes_commas() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("courses.csv");
        let course = Course::builder(CourseIdentifier::new("CS101").unwrap(), "Logic, Sets and Proofs")
            .credits(3)
            .instructor("Turing")
            .semester(Semester::Winter)
            .department("CS")
            .build()
            .unwrap()
            .with_created_on(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());

        export_courses(&path, &[course]).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("CS101,\"Logic, Sets and Proofs\",3,Turing,WINTER,CS,2024-01-15"));

        let back = import_courses(&path).unwrap();
        assert_eq!(back[0].title(), "Logic, Sets and Proofs");
    }

    #[test]
    fn test_export_enrollments_only_graded_rows() {
        let dir = TempDir::new().unwrap();
        let students = StudentRegistry::new();
        let courses = CourseRegistry::new();
        for course in import_courses(&write(&dir, "courses.csv", COURSES_CSV)).unwrap() {
            courses.add(course).unwrap();
        }
        for student in import_students(&write(&dir, "students.csv", STUDENTS_CSV)).unwrap() {
            students.add(student).unwrap();
        }

        let cs = courses.find_by_id("CS101").unwrap();
        let math = courses.find_by_id("MATH201").unwrap();
        students.enroll("S001", &cs).unwrap();
        students.enroll("S001", &math).unwrap();
        students.enroll("S002", &cs).unwrap();
        students.assign_grade("S001", math.code(), Grade::B).unwrap();
        students.assign_grade("S002", cs.code(), Grade::S).unwrap();

        let path = dir.path().join("enrollments.csv");
        let rows = export_enrollments(&path, &students.all(), &courses).unwrap();
        assert_eq!(rows, 2);

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "StudentID,StudentName,CourseCode,CourseTitle,Grade,GradePoints\n\
             S001,Ada Lovelace,MATH201,Linear Algebra,B,8.0\n\
             S002,Alan Mathison Turing,CS101,Intro to Programming,S,10.0\n"
        );
    }

    #[test]
    fn test_save_then_load_data_dir() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir);

        let students = StudentRegistry::new();
        let courses = CourseRegistry::new();
        for course in import_courses(&write(&dir, "courses.csv", COURSES_CSV)).unwrap() {
            courses.add(course).unwrap();
        }
        for student in import_students(&write(&dir, "students.csv", STUDENTS_CSV)).unwrap() {
            students.add(student).unwrap();
        }
        students.enroll("S001", &courses.find_by_id("CS101").unwrap()).unwrap();
        students
            .assign_grade("S001", &CourseIdentifier::new("CS101").unwrap(), Grade::A)
            .unwrap();
        students.deactivate("S002");

        save_data_dir(&config, &students, &courses).unwrap();
        let (loaded_students, loaded_courses) = load_data_dir(&config).unwrap();

        assert_eq!(loaded_courses.all(), courses.all());
        assert_eq!(loaded_students.len(), 2);

        let ada = loaded_students.find_by_id("S001").unwrap();
        let original = students.find_by_id("S001").unwrap();
        assert_eq!(ada.grades(), original.grades());
        assert_eq!(ada.profile().created_on(), original.profile().created_on());

        let alan = loaded_students.find_by_id("S002").unwrap();
        assert_eq!(alan.status(), StudentStatus::Inactive);
    }

    #[test]
    fn test_data_dir_keeps_ungraded_enrollments() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir);
        let students = StudentRegistry::new();
        let courses = CourseRegistry::new();
        for course in import_courses(&write(&dir, "courses.csv", COURSES_CSV)).unwrap() {
            courses.add(course).unwrap();
        }
        for student in import_students(&write(&dir, "students.csv", STUDENTS_CSV)).unwrap() {
            students.add(student).unwrap();
        }
        let cs = courses.find_by_id("CS101").unwrap();
        let math = courses.find_by_id("MATH201").unwrap();
        students.enroll("S001", &cs).unwrap();
        students.enroll("S001", &math).unwrap();
        students.assign_grade("S001", math.code(), Grade::B).unwrap();

        save_data_dir(&config, &students, &courses).unwrap();
        let text = fs::read_to_string(config.enrollments_path()).unwrap();
        assert!(text.contains("S001,Ada Lovelace,CS101,Intro to Programming,,\n"));

        let (loaded, _) = load_data_dir(&config).unwrap();
        let ada = loaded.find_by_id("S001").unwrap();
        assert!(ada.is_enrolled(cs.code()));
        assert_eq!(ada.grade_for(cs.code()), None);
        assert_eq!(ada.grade_for(math.code()), Some(Grade::B));
    }

    #[test]
    fn test_load_empty_data_dir() {
        let dir = TempDir::new().unwrap();
        let (students, courses) = load_data_dir(&config_for(&dir)).unwrap();
        assert!(students.is_empty());
        assert!(courses.is_empty());
    }

    #[test]
    fn test_load_rejects_duplicate_students() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir);
        fs::create_dir_all(&config.data_dir).unwrap();
        fs::write(
            config.students_path(),
            "ID,RegNo,Name,Email\nS001,REG-001,Ada Lovelace,a@x.edu\nS001,REG-002,Alan Turing,t@x.edu\n",
        )
        .unwrap();

        let err = load_data_dir(&config).unwrap_err();
        let cause = err.downcast_ref::<RecordsError>().unwrap();
        assert_eq!(cause.kind(), ErrorKind::DuplicateKey);
    }

    #[test]
    fn test_import_enrollments_unknown_course() {
        let dir = TempDir::new().unwrap();
        let students = StudentRegistry::new();
        let courses = CourseRegistry::new();
        for student in import_students(&write(&dir, "students.csv", STUDENTS_CSV)).unwrap() {
            students.add(student).unwrap();
        }
        let path = write(
            &dir,
            "enrollments.csv",
            "StudentID,StudentName,CourseCode,CourseTitle,Grade,GradePoints\nS001,Ada Lovelace,CS101,Intro,A,9.0\n",
        );

        let err = import_enrollments(&path, &students, &courses).unwrap_err();
        assert!(err.to_string().contains("Unknown course 'CS101' at line 2"));
    }

    #[test]
    fn test_snapshot_json() {
        let dir = TempDir::new().unwrap();
        let courses = import_courses(&write(&dir, "courses.csv", COURSES_CSV)).unwrap();
        let students = import_students(&write(&dir, "students.csv", STUDENTS_CSV)).unwrap();
        let path = dir.path().join("snapshot.json");

        export_snapshot_json(&path, &students, &courses).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["students"].as_array().unwrap().len(), 2);
        assert_eq!(value["courses"][0]["code"], "CS101");
        assert_eq!(value["students"][0]["regno"], "REG-001");
    }
}
