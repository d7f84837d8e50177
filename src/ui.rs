use anyhow::Result;
use campus_records::{
    Course, CourseOrder, CourseRegistry, Student, StudentOrder, StudentRegistry, TranscriptEngine,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Students,
    Courses,
    Rankings,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Students => Page::Courses,
            Page::Courses => Page::Rankings,
            Page::Rankings => Page::Students,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Students => Page::Rankings,
            Page::Courses => Page::Students,
            Page::Rankings => Page::Courses,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Students => "Students",
            Page::Courses => "Courses",
            Page::Rankings => "Rankings",
        }
    }
}

/// Read-only browser over a snapshot of both registries.
pub struct App {
    students: StudentRegistry,
    courses: CourseRegistry,
    pub student_rows: Vec<(Student, f64)>,
    pub course_rows: Vec<Course>,
    pub rankings: Vec<(Student, f64)>,
    pub current_page: Page,
    pub students_state: TableState,
    pub courses_state: TableState,
    pub rankings_state: TableState,
    pub show_detail: bool,
}

impl App {
    pub fn new(students: &StudentRegistry, courses: &CourseRegistry) -> Self {
        let engine = TranscriptEngine::new(students, courses);

        let student_rows: Vec<(Student, f64)> = students
            .sorted(StudentOrder::Name)
            .into_iter()
            .map(|s| {
                let gpa = engine.gpa(s.id()).unwrap_or(0.0);
                (s, gpa)
            })
            .collect();
        let course_rows = courses.sorted(CourseOrder::Code);
        let rankings = engine.ranking();

        Self {
            students: students.clone(),
            courses: courses.clone(),
            students_state: initial_state(student_rows.len()),
            courses_state: initial_state(course_rows.len()),
            rankings_state: initial_state(rankings.len()),
            student_rows,
            course_rows,
            rankings,
            current_page: Page::Students,
            show_detail: false,
        }
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    fn current_len(&self) -> usize {
        match self.current_page {
            Page::Students => self.student_rows.len(),
            Page::Courses => self.course_rows.len(),
            Page::Rankings => self.rankings.len(),
        }
    }

    fn current_state(&mut self) -> &mut TableState {
        match self.current_page {
            Page::Students => &mut self.students_state,
            Page::Courses => &mut self.courses_state,
            Page::Rankings => &mut self.rankings_state,
        }
    }

    pub fn next(&mut self) {
        let len = self.current_len();
        if len == 0 {
            return;
        }
        let state = self.current_state();
        let i = match state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.current_len();
        if len == 0 {
            return;
        }
        let state = self.current_state();
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }

    pub fn selected_student(&self) -> Option<&Student> {
        match self.current_page {
            Page::Students => self
                .students_state
                .selected()
                .and_then(|i| self.student_rows.get(i))
                .map(|(s, _)| s),
            Page::Rankings => self
                .rankings_state
                .selected()
                .and_then(|i| self.rankings.get(i))
                .map(|(s, _)| s),
            Page::Courses => None,
        }
    }

    pub fn selected_course(&self) -> Option<&Course> {
        match self.current_page {
            Page::Courses => self
                .courses_state
                .selected()
                .and_then(|i| self.course_rows.get(i)),
            _ => None,
        }
    }

    pub fn selected_transcript(&self) -> Option<String> {
        let student = self.selected_student()?;
        TranscriptEngine::new(&self.students, &self.courses)
            .transcript_text(student.id())
            .ok()
    }

    pub fn enrolled_count(&self, course: &Course) -> usize {
        self.student_rows
            .iter()
            .filter(|(s, _)| s.is_enrolled(course.code()))
            .count()
    }
}

fn initial_state(len: usize) -> TableState {
    let mut state = TableState::default();
    if len > 0 {
        state.select(Some(0));
    }
    state
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Enter => app.toggle_detail(),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    let content = if app.show_detail {
        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);
        render_detail_panel(f, split[1], app);
        split[0]
    } else {
        chunks[1]
    };

    match app.current_page {
        Page::Students => render_students(f, content, app),
        Page::Courses => render_courses(f, content, app),
        Page::Rankings => render_rankings(f, content, app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![];
    for (i, page) in [Page::Students, Page::Courses, Page::Rankings].iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Students: {}", app.student_rows.len()),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  "));
    tab_spans.push(Span::styled(
        format!("Courses: {}", app.course_rows.len()),
        Style::default().fg(Color::White),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    let cells = titles.iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    Row::new(cells).style(Style::default().bg(Color::DarkGray)).height(1)
}

fn gpa_color(gpa: f64) -> Color {
    if gpa >= 8.0 {
        Color::Green
    } else if gpa >= 6.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}

fn table_block(title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(title)
}

fn highlight() -> Style {
    Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
}

fn render_students(f: &mut Frame, area: Rect, app: &mut App) {
    let rows = app.student_rows.iter().map(|(s, gpa)| {
        let status_color = if s.is_active() { Color::Green } else { Color::DarkGray };
        Row::new(vec![
            Cell::from(s.id().to_string()),
            Cell::from(s.regno().to_string()),
            Cell::from(truncate(&s.name().full_name(), 28)),
            Cell::from(truncate(s.email(), 28)),
            Cell::from(s.status().as_str()).style(Style::default().fg(status_color)),
            Cell::from(s.total_enrolled().to_string()),
            Cell::from(format!("{:.2}", gpa)).style(Style::default().fg(gpa_color(*gpa))),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(30),
            Constraint::Length(30),
            Constraint::Length(11),
            Constraint::Length(8),
            Constraint::Length(6),
        ],
    )
    .header(header_row(&["ID", "RegNo", "Name", "Email", "Status", "Courses", "GPA"]))
    .block(table_block(" Students "))
    .highlight_style(highlight())
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.students_state);
}

fn render_courses(f: &mut Frame, area: Rect, app: &mut App) {
    let rows = app.course_rows.iter().map(|c| {
        Row::new(vec![
            Cell::from(c.code().to_string()),
            Cell::from(truncate(c.title(), 30)),
            Cell::from(c.credits().to_string()),
            Cell::from(truncate(c.instructor(), 22)),
            Cell::from(c.semester().as_str()),
            Cell::from(truncate(c.department(), 22)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(32),
            Constraint::Length(8),
            Constraint::Length(24),
            Constraint::Length(9),
            Constraint::Length(24),
        ],
    )
    .header(header_row(&["Code", "Title", "Credits", "Instructor", "Semester", "Department"]))
    .block(table_block(" Courses "))
    .highlight_style(highlight())
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.courses_state);
}

fn render_rankings(f: &mut Frame, area: Rect, app: &mut App) {
    let rows = app.rankings.iter().enumerate().map(|(rank, (s, gpa))| {
        Row::new(vec![
            Cell::from(format!("{}", rank + 1)),
            Cell::from(truncate(&s.name().full_name(), 28)),
            Cell::from(s.regno().to_string()),
            Cell::from(format!("{:.2}", gpa)).style(Style::default().fg(gpa_color(*gpa))),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(30),
            Constraint::Length(12),
            Constraint::Length(6),
        ],
    )
    .header(header_row(&["Rank", "Name", "RegNo", "GPA"]))
    .block(table_block(" Rankings - graded students by GPA "))
    .highlight_style(highlight())
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.rankings_state);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let (title, content) = match app.current_page {
        Page::Courses => (" Course Details ", course_detail(app)),
        _ => (" Transcript ", transcript_detail(app)),
    };

    let panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(title),
    );

    f.render_widget(panel, area);
}

fn transcript_detail(app: &App) -> Vec<Line<'static>> {
    match app.selected_transcript() {
        Some(text) => text.lines().map(|l| Line::from(l.to_string())).collect(),
        None => vec![Line::from("No student selected")],
    }
}

fn course_detail(app: &App) -> Vec<Line<'static>> {
    let Some(course) = app.selected_course() else {
        return vec![Line::from("No course selected")];
    };

    let label = |name: &str| {
        Span::styled(
            format!("  {}: ", name),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )
    };

    vec![
        Line::from(""),
        Line::from(vec![label("Code"), Span::raw(course.code().to_string())]),
        Line::from(vec![label("Title"), Span::raw(course.title().to_string())]),
        Line::from(vec![label("Credits"), Span::raw(course.credits().to_string())]),
        Line::from(vec![label("Instructor"), Span::raw(course.instructor().to_string())]),
        Line::from(vec![label("Semester"), Span::raw(course.semester().display_name())]),
        Line::from(vec![label("Department"), Span::raw(course.department().to_string())]),
        Line::from(vec![label("Created"), Span::raw(course.created_on().to_string())]),
        Line::from(vec![label("Enrolled"), Span::raw(app.enrolled_count(course).to_string())]),
        Line::from(""),
        Line::from(Span::styled(
            "  Press Enter to close",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ]
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = match app.current_page {
        Page::Students => app.students_state.selected(),
        Page::Courses => app.courses_state.selected(),
        Page::Rankings => app.rankings_state.selected(),
    }
    .map(|i| i + 1)
    .unwrap_or(0);

    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
    let status_spans = vec![
        Span::styled(
            format!(" Row: {}/{} ", selected, app.current_len()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(" | "),
        key("Enter"),
        Span::raw(" Details | "),
        key("Tab"),
        Span::raw(" Page | "),
        key("↑/↓"),
        Span::raw(" Nav | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_records::{CourseIdentifier, Grade, Name, Semester};

    fn sample_app() -> App {
        let students = StudentRegistry::new();
        let courses = CourseRegistry::new();
        let course = Course::builder(CourseIdentifier::new("CS101").unwrap(), "Intro")
            .credits(3)
            .instructor("Turing")
            .semester(Semester::Fall)
            .department("CS")
            .build()
            .unwrap();
        courses.add(course.clone()).unwrap();

        for (id, first) in [("S1", "Ada"), ("S2", "Bob")] {
            let name = Name::new(first, "Smith").unwrap();
            students
                .add(Student::new(id, name, "x@y.edu", &format!("R-{}", id)).unwrap())
                .unwrap();
        }
        students.enroll("S2", &course).unwrap();
        students.assign_grade("S2", course.code(), Grade::A).unwrap();

        App::new(&students, &courses)
    }

    #[test]
    fn test_page_cycle() {
        assert_eq!(Page::Students.next(), Page::Courses);
        assert_eq!(Page::Rankings.next(), Page::Students);
        assert_eq!(Page::Students.previous(), Page::Rankings);
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = sample_app();
        assert_eq!(app.students_state.selected(), Some(0));
        app.next();
        assert_eq!(app.students_state.selected(), Some(1));
        app.next();
        assert_eq!(app.students_state.selected(), Some(0));
        app.previous();
        assert_eq!(app.students_state.selected(), Some(1));
    }

    #[test]
    fn test_rankings_only_graded() {
        let mut app = sample_app();
        assert_eq!(app.rankings.len(), 1);

        app.next_page();
        app.next_page();
        assert_eq!(app.current_page, Page::Rankings);
        assert_eq!(app.selected_student().unwrap().id(), "S2");
        let transcript = app.selected_transcript().unwrap();
        assert!(transcript.contains("GPA: 9.00"));
    }

    #[test]
    fn test_course_detail_counts_enrolled() {
        let mut app = sample_app();
        app.next_page();
        let course = app.selected_course().unwrap().clone();
        assert_eq!(app.enrolled_count(&course), 1);
        assert!(app.selected_student().is_none());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long course title", 10), "a very ...");
    }
}
