// 📜 Transcript Engine - grades in, GPA and reports out
//
// Holds no state of its own. Grades are written through the student registry;
// everything else is a read over both registries. Course credits are looked up
// at read time, so a credit change on a course shows up in every GPA.

use crate::entities::course::CourseRegistry;
use crate::entities::grade::Grade;
use crate::entities::student::{Student, StudentRegistry};
use crate::error::RecordsError;
use std::fmt::Write;

/// Title column width in the transcript table.
const TITLE_WIDTH: usize = 30;
const RULE_WIDTH: usize = 60;

// ============================================================================
// GPA BANDS
// ============================================================================

/// Fixed GPA buckets, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GpaBand {
    Excellent,
    VeryGood,
    Good,
    Average,
    BelowAverage,
}

impl GpaBand {
    pub const ALL: [GpaBand; 5] = [
        GpaBand::Excellent,
        GpaBand::VeryGood,
        GpaBand::Good,
        GpaBand::Average,
        GpaBand::BelowAverage,
    ];

    pub fn for_gpa(gpa: f64) -> Self {
        if gpa >= 9.0 {
            GpaBand::Excellent
        } else if gpa >= 8.0 {
            GpaBand::VeryGood
        } else if gpa >= 7.0 {
            GpaBand::Good
        } else if gpa >= 6.0 {
            GpaBand::Average
        } else {
            GpaBand::BelowAverage
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GpaBand::Excellent => "Excellent (9.0+)",
            GpaBand::VeryGood => "Very Good (8.0-8.9)",
            GpaBand::Good => "Good (7.0-7.9)",
            GpaBand::Average => "Average (6.0-6.9)",
            GpaBand::BelowAverage => "Below Average (<6.0)",
        }
    }
}

// ============================================================================
// TRANSCRIPT ENGINE
// ============================================================================

pub struct TranscriptEngine<'a> {
    students: &'a StudentRegistry,
    courses: &'a CourseRegistry,
}

impl<'a> TranscriptEngine<'a> {
    pub fn new(students: &'a StudentRegistry, courses: &'a CourseRegistry) -> Self {
        TranscriptEngine { students, courses }
    }

    /// Record (or overwrite) a grade for a course the student is enrolled in.
    pub fn record_grade(
        &self,
        student_id: &str,
        course_code: &str,
        grade: Grade,
    ) -> Result<(), RecordsError> {
        let student = self.student(student_id)?;
        let course = self
            .courses
            .find_by_id(course_code)
            .ok_or_else(|| RecordsError::not_found("Course", course_code.trim()))?;

        self.students.assign_grade(student.id(), course.code(), grade)
    }

    /// Credit-weighted grade-point average over graded courses; 0.0 if none.
    pub fn gpa(&self, student_id: &str) -> Result<f64, RecordsError> {
        let student = self.student(student_id)?;
        Ok(self.gpa_of(&student))
    }

    /// Credits of every enrolled course, graded or not.
    pub fn total_credits(&self, student_id: &str) -> Result<u32, RecordsError> {
        let student = self.student(student_id)?;
        Ok(self.total_credits_of(&student))
    }

    pub fn transcript_text(&self, student_id: &str) -> Result<String, RecordsError> {
        let student = self.student(student_id)?;
        Ok(self.render_transcript(&student))
    }

    /// Average GPA of the students falling in each band.
    ///
    /// Every registered student counts, including those without grades
    /// (GPA 0.0). Bands with no students are left out.
    pub fn gpa_distribution(&self) -> Vec<(GpaBand, f64)> {
        let mut sums = [(0.0_f64, 0_usize); 5];
        for student in self.students.all() {
            let gpa = self.gpa_of(&student);
            let slot = &mut sums[GpaBand::for_gpa(gpa) as usize];
            slot.0 += gpa;
            slot.1 += 1;
        }

        GpaBand::ALL
            .into_iter()
            .zip(sums)
            .filter(|(_, (_, count))| *count > 0)
            .map(|(band, (sum, count))| (band, sum / count as f64))
            .collect()
    }

    /// Students with at least one grade, highest GPA first.
    /// Equal GPAs keep registry insertion order.
    pub fn ranking(&self) -> Vec<(Student, f64)> {
        let mut ranked: Vec<(Student, f64)> = self
            .students
            .all()
            .into_iter()
            .filter(Student::has_grades)
            .map(|s| {
                let gpa = self.gpa_of(&s);
                (s, gpa)
            })
            .collect();

        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    pub fn top_students(&self, n: usize) -> Vec<Student> {
        self.ranking()
            .into_iter()
            .take(n)
            .map(|(student, _)| student)
            .collect()
    }

    fn student(&self, student_id: &str) -> Result<Student, RecordsError> {
        self.students
            .find_by_id(student_id)
            .ok_or_else(|| RecordsError::not_found("Student", student_id))
    }

    fn gpa_of(&self, student: &Student) -> f64 {
        let (weighted, credits) = student
            .grades()
            .iter()
            .filter_map(|(code, grade)| {
                self.courses
                    .get(code)
                    .map(|course| (grade.points(), course.credits()))
            })
            .fold((0.0, 0_u32), |(weighted, credits), (points, c)| {
                (weighted + points * f64::from(c), credits + c)
            });

        if credits == 0 {
            return 0.0;
        }
        weighted / f64::from(credits)
    }

    fn total_credits_of(&self, student: &Student) -> u32 {
        student
            .enrolled_courses()
            .iter()
            .filter_map(|code| self.courses.get(code))
            .map(|course| course.credits())
            .sum()
    }

    fn render_transcript(&self, student: &Student) -> String {
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);
        let mut out = String::new();

        // Writing into a String cannot fail
        let _ = writeln!(out, "{heavy}");
        let _ = writeln!(out, "OFFICIAL TRANSCRIPT");
        let _ = writeln!(out, "{heavy}");
        let _ = writeln!(out, "Student: {}", student.name().full_name());
        let _ = writeln!(out, "ID: {}", student.id());
        let _ = writeln!(out, "Registration No: {}", student.regno());
        let _ = writeln!(out, "Status: {}", student.status());
        let _ = writeln!(out, "{light}");

        let _ = writeln!(out, "COURSES AND GRADES:");
        let _ = writeln!(
            out,
            "{:<10} {:<30} {:<8} {:<5} {:<5}",
            "Code", "Title", "Credits", "Grade", "Points"
        );
        let _ = writeln!(out, "{light}");

        // BTreeMap iteration is already in course-code order
        for (code, grade) in student.grades() {
            let (title, credits) = match self.courses.get(&code) {
                Some(course) => (truncate(course.title(), TITLE_WIDTH), course.credits()),
                None => (String::from("(unknown course)"), 0),
            };
            let _ = writeln!(
                out,
                "{:<10} {:<30} {:<8} {:<5} {:<5.1}",
                code.as_str(),
                title,
                credits,
                grade.letter(),
                grade.points()
            );
        }

        let _ = writeln!(out, "{light}");
        let _ = writeln!(out, "Total Credits: {}", self.total_credits_of(student));
        let _ = writeln!(out, "GPA: {:.2}", self.gpa_of(student));
        let _ = writeln!(out, "{heavy}");
        out
    }
}

/// Cut to `max` characters, ending in "..." when shortened.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

// ============================================================================
// TESTS
// ============================================================================
