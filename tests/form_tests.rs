use chrono::NaiveDate;

use taskboard::error::ValidationError;
use taskboard::form::{Draft, FormField, FormMode, TaskForm};
use taskboard::models::{Category, Task, TaskId};

fn draft(title: &str, description: &str) -> Draft {
    Draft {
        title: title.into(),
        description: description.into(),
        ..Draft::default()
    }
}

#[test]
fn test_valid_draft_is_trimmed() {
    let mut d = draft("  Write report ", " numbers ");
    d.due_date = "2025-12-01".into();
    d.category = Category::InProgress;
    let input = d.validate(true).unwrap();
    assert_eq!(input.title, "Write report");
    assert_eq!(input.description, "numbers");
    assert_eq!(input.category, Category::InProgress);
    assert_eq!(input.due_date, NaiveDate::from_ymd_opt(2025, 12, 1));
}

#[test]
fn test_title_rules() {
    assert_eq!(draft("   ", "d").validate(true), Err(ValidationError::EmptyTitle));
    assert!(draft(&"x".repeat(50), "d").validate(true).is_ok());
    assert_eq!(
        draft(&"x".repeat(51), "d").validate(true),
        Err(ValidationError::TitleTooLong { len: 51 })
    );
}

#[test]
fn test_description_rules() {
    assert_eq!(draft("t", "").validate(true), Err(ValidationError::EmptyDescription));
    assert!(draft("t", "").validate(false).is_ok());
    assert!(draft("t", &"y".repeat(200)).validate(true).is_ok());
    assert_eq!(
        draft("t", &"y".repeat(201)).validate(false),
        Err(ValidationError::DescriptionTooLong { len: 201 })
    );
}

#[test]
fn test_length_counts_characters_not_bytes() {
    assert!(draft(&"é".repeat(50), "d").validate(true).is_ok());
}

#[test]
fn test_due_date_rules() {
    let mut d = draft("t", "d");
    assert_eq!(d.validate(true).unwrap().due_date, None);

    d.due_date = "tomorrow".into();
    assert_eq!(
        d.validate(true),
        Err(ValidationError::InvalidDueDate("tomorrow".into()))
    );

    d.due_date = "2025-02-30".into();
    assert!(d.validate(true).is_err());

    // Trailing input after a valid date is rejected, not dropped.
    for raw in ["2025-12-01Tgarbage", "2025-12-01T", "2025-12-01 x"] {
        d.due_date = raw.into();
        assert_eq!(
            d.validate(true),
            Err(ValidationError::InvalidDueDate(raw.into()))
        );
    }

    d.due_date = " 2025-12-01 ".into();
    assert_eq!(
        d.validate(true).unwrap().due_date,
        NaiveDate::from_ymd_opt(2025, 12, 1)
    );
}

#[test]
fn test_new_draft_defaults_to_todo() {
    let mut form = TaskForm::new(true);
    assert_eq!(form.mode(), FormMode::Idle);
    assert!(!form.is_open());

    form.open_create();
    assert_eq!(form.mode(), FormMode::Creating);
    let d = form.draft().unwrap();
    assert_eq!(d.category, Category::Todo);
    assert!(d.id.is_none());
}

#[test]
fn test_edit_copies_task() {
    let task = Task {
        id: TaskId::from("abc"),
        title: "T".into(),
        description: "D".into(),
        category: Category::Done,
        due_date: NaiveDate::from_ymd_opt(2030, 1, 5),
    };
    let mut form = TaskForm::new(true);
    form.open_edit(&task);

    assert_eq!(form.mode(), FormMode::Editing);
    let d = form.draft().unwrap();
    assert_eq!(d.id, Some(TaskId::from("abc")));
    assert_eq!(d.due_date, "2030-01-05");
    assert_eq!(d.category, Category::Done);
}

#[test]
fn test_validate_without_draft() {
    let form = TaskForm::new(true);
    assert_eq!(form.validate(), Err(ValidationError::NoDraft));
}

#[test]
fn test_typing_goes_to_focused_field() {
    let mut form = TaskForm::new(true);
    form.open_create();
    assert_eq!(form.focus(), FormField::Title);
    for c in "Hi".chars() {
        form.push_char(c);
    }
    form.next_field();
    form.push_char('x');
    form.pop_char();
    form.push_char('d');
    form.next_field();
    form.next_field();
    assert_eq!(form.focus(), FormField::Category);
    // The category is not a text field.
    form.push_char('z');
    form.cycle_category(true);

    let d = form.draft().unwrap();
    assert_eq!(d.title, "Hi");
    assert_eq!(d.description, "d");
    assert_eq!(d.category, Category::InProgress);

    form.next_field();
    assert_eq!(form.focus(), FormField::Title);
    form.previous_field();
    assert_eq!(form.focus(), FormField::Category);
}

#[test]
fn test_cycle_category_wraps() {
    let mut form = TaskForm::new(true);
    form.open_create();
    form.cycle_category(false);
    assert_eq!(form.draft().unwrap().category, Category::Done);
    form.cycle_category(true);
    assert_eq!(form.draft().unwrap().category, Category::Todo);
}

#[test]
fn test_cancel_clears_draft_and_error() {
    let mut form = TaskForm::new(true);
    form.open_create();
    form.set_error("Title is required");
    form.next_field();

    form.cancel();

    assert_eq!(form.mode(), FormMode::Idle);
    assert!(form.draft().is_none());
    assert!(form.error().is_none());
    assert_eq!(form.focus(), FormField::Title);
}
