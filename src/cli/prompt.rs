use crate::cli::host::{highlighted, TerminalHost};
use crate::review::{Resolution, ReviewSession, SuggestionRecord};
use anyhow::{Context, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Skip,
    Candidate(usize),
    Original,
    Type,
    Quit,
}

/// Menu entries for one record, with the entry matching its current resolution.
fn menu(record: &SuggestionRecord, max_candidates: usize) -> (Vec<(String, Action)>, usize) {
    let mut items = vec![("Leave as is".to_string(), Action::Skip)];
    // The selected candidate stays listed even past the cutoff.
    let selected = match record.resolution {
        Resolution::Candidate(index) => Some(index),
        _ => None,
    };
    for (index, candidate) in record.candidates.iter().enumerate() {
        if index < max_candidates || selected == Some(index) {
            items.push((format!("Use \"{}\"", candidate), Action::Candidate(index)));
        }
    }
    items.push((format!("Keep original \"{}\"", record.original), Action::Original));
    items.push(("Type a correction".to_string(), Action::Type));
    items.push(("Quit without applying".to_string(), Action::Quit));

    let current = match record.resolution {
        Resolution::None => Action::Skip,
        Resolution::Original => Action::Original,
        Resolution::Candidate(index) => Action::Candidate(index),
        Resolution::UserText => Action::Type,
    };
    let default = items
        .iter()
        .position(|(_, action)| *action == current)
        .unwrap_or(0);

    (items, default)
}

/// Walk every record interactively. Returns `false` if the user quit.
pub fn review_records(
    session: &mut ReviewSession,
    host: &mut TerminalHost,
    max_candidates: usize,
) -> Result<bool> {
    let theme = ColorfulTheme::default();
    let total = session.records().len();

    for index in 0..total {
        session.focus(index, host);

        let Some(record) = session.records().get(index) else {
            break;
        };
        let (items, default) = menu(record, max_candidates);
        let prompt = format!(
            "[{}/{}] {}",
            index + 1,
            total,
            highlighted(host, &record.paragraph_id, &record.original)
        );
        let initial_text = record.user_text.clone();

        let labels: Vec<&str> = items.iter().map(|(label, _)| label.as_str()).collect();
        let choice = Select::with_theme(&theme)
            .with_prompt(prompt)
            .items(&labels)
            .default(default)
            .interact_opt()
            .context("Failed to read selection")?;

        let action = match choice {
            Some(choice) => items[choice].1,
            None => Action::Quit,
        };

        let Some(record) = session.record_mut(index) else {
            break;
        };
        match action {
            Action::Skip => record.clear(),
            Action::Original => record.choose_original(),
            Action::Candidate(candidate) => record.choose_candidate(candidate)?,
            Action::Type => {
                let text: String = Input::with_theme(&theme)
                    .with_prompt("Correction")
                    .with_initial_text(initial_text)
                    .validate_with(|input: &String| -> Result<(), &str> {
                        if input.trim().is_empty() {
                            Err("correction cannot be blank")
                        } else {
                            Ok(())
                        }
                    })
                    .interact_text()
                    .context("Failed to read correction")?;
                record.set_user_text(text);
                record.choose_user_text();
            }
            Action::Quit => return Ok(false),
        }
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(candidates: &[&str], resolution: Resolution) -> SuggestionRecord {
        SuggestionRecord {
            paragraph_id: "p".to_string(),
            error_id: "e".to_string(),
            original: "teh".to_string(),
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
            user_text: String::new(),
            resolution,
        }
    }

    #[test]
    fn test_menu_layout() {
        let (items, default) = menu(&record(&["the", "tea"], Resolution::None), 5);
        let actions: Vec<_> = items.iter().map(|(_, a)| *a).collect();
        assert_eq!(
            actions,
            vec![
                Action::Skip,
                Action::Candidate(0),
                Action::Candidate(1),
                Action::Original,
                Action::Type,
                Action::Quit
            ]
        );
        assert_eq!(default, 0);
    }

    #[test]
    fn test_menu_defaults_to_current_choice() {
        let (items, default) = menu(&record(&["the", "tea"], Resolution::Candidate(1)), 5);
        assert_eq!(items[default].0, "Use \"tea\"");

        let (items, default) = menu(&record(&["the"], Resolution::UserText), 5);
        assert_eq!(items[default].1, Action::Type);
    }

    #[test]
    fn test_menu_truncates_candidates() {
        let (items, default) = menu(&record(&["a", "b", "c", "d"], Resolution::None), 2);
        assert_eq!(items.len(), 6);
        assert_eq!(default, 0);
    }

    #[test]
    fn test_menu_keeps_selected_candidate_past_cutoff() {
        let (items, default) = menu(&record(&["a", "b", "c", "d"], Resolution::Candidate(3)), 2);
        let labels: Vec<_> = items.iter().map(|(label, _)| label.as_str()).collect();
        assert_eq!(&labels[1..4], &["Use \"a\"", "Use \"b\"", "Use \"d\""]);
        assert_eq!(items[default].1, Action::Candidate(3));
    }

    #[test]
    fn test_menu_without_candidate_slots() {
        let (items, default) = menu(&record(&["the"], Resolution::Candidate(0)), 0);
        assert_eq!(items.len(), 5);
        assert_eq!(items[default], ("Use \"the\"".to_string(), Action::Candidate(0)));
    }
}
