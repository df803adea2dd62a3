use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Focus, InputMode, TextField, Tool, WebsiteView, ASPECT_RATIOS, LANGUAGES, MAX_IMAGES};
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.poll_tasks().await;
            app.tick_animation();
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global quit, any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match app.focus {
        Focus::Sidebar => handle_sidebar(app, key),
        Focus::Panel => handle_panel_normal(app, key),
    }
}

fn handle_sidebar(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.sidebar_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.sidebar_nav_up(),
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => app.select_tool(),
        _ => {}
    }
}

fn handle_panel_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Back to the sidebar
        KeyCode::Esc | KeyCode::Char('h') | KeyCode::Left
            if !is_selector_focused(app) || matches!(key.code, KeyCode::Esc) =>
        {
            app.focus = Focus::Sidebar;
        }

        // Cycle the panel's input fields
        KeyCode::Tab => cycle_field(app),

        // Edit the focused text field
        KeyCode::Char('i') => {
            if active_field(app).is_some() {
                app.input_mode = InputMode::Editing;
            }
        }

        // Selector fields change value with left/right
        KeyCode::Left => adjust_selector(app, -1),
        KeyCode::Right => adjust_selector(app, 1),

        KeyCode::Enter => match app.active_tool {
            Tool::Voice => app.toggle_voice_playback(),
            Tool::Chat => app.input_mode = InputMode::Editing,
            _ => submit_active(app),
        },

        // Play/stop toggle
        KeyCode::Char(' ') if app.active_tool == Tool::Voice => app.toggle_voice_playback(),

        // Content checker runs two operations over the same input
        KeyCode::Char('a') if app.active_tool == Tool::ContentChecker => app.submit_analyze(),
        KeyCode::Char('H') if app.active_tool == Tool::ContentChecker => app.submit_humanize(),

        // Website result view toggle
        KeyCode::Char('t') if app.active_tool == Tool::Website => {
            app.website.view = match app.website.view {
                WebsiteView::Preview => WebsiteView::Code,
                WebsiteView::Code => WebsiteView::Preview,
            };
            app.website.scroll = 0;
        }

        // New conversation
        KeyCode::Char('r') if app.active_tool == Tool::Chat => app.reset_chat(),

        KeyCode::Char('j') | KeyCode::Down => {
            if voice_list_focused(app) {
                app.voice_nav_down();
            } else {
                scroll_result(app, 1);
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if voice_list_focused(app) {
                app.voice_nav_up();
            } else {
                scroll_result(app, -1);
            }
        }
        KeyCode::Char('g') => scroll_top(app),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,

        KeyCode::Enter => {
            submit_active(app);
            // The chat input stays focused between exchanges
            if app.active_tool != Tool::Chat {
                app.input_mode = InputMode::Normal;
            }
        }

        KeyCode::Tab => {
            app.input_mode = InputMode::Normal;
            cycle_field(app);
        }

        KeyCode::Backspace => {
            if let Some(field) = active_field(app) {
                field.backspace();
            }
        }
        KeyCode::Delete => {
            if let Some(field) = active_field(app) {
                field.delete();
            }
        }
        KeyCode::Left => {
            if let Some(field) = active_field(app) {
                field.left();
            }
        }
        KeyCode::Right => {
            if let Some(field) = active_field(app) {
                field.right();
            }
        }
        KeyCode::Home => {
            if let Some(field) = active_field(app) {
                field.home();
            }
        }
        KeyCode::End => {
            if let Some(field) = active_field(app) {
                field.end();
            }
        }
        KeyCode::Char(c) => {
            if let Some(field) = active_field(app) {
                field.insert(c);
            }
        }
        _ => {}
    }
}

/// The text field the cursor is on, if the focused field is editable text.
fn active_field(app: &mut App) -> Option<&mut TextField> {
    match app.active_tool {
        Tool::Image => (app.image.field == 0).then(|| &mut app.image.prompt),
        Tool::Recipe => Some(if app.recipe.field == 0 {
            &mut app.recipe.ingredients
        } else {
            &mut app.recipe.diet
        }),
        Tool::Voice => (app.voice.field == 0).then(|| &mut app.voice.text),
        Tool::Chat => Some(&mut app.chat.input),
        Tool::Website => Some(&mut app.website.prompt),
        Tool::MobileUi => Some(&mut app.mobile.prompt),
        Tool::Chart => Some(&mut app.chart.prompt),
        Tool::ContentChecker => Some(&mut app.content.text),
        Tool::CodeExplainer => (app.code.field == 0).then(|| &mut app.code.code),
        Tool::LanguageDetector => Some(&mut app.detect.code),
    }
}

fn submit_active(app: &mut App) {
    match app.active_tool {
        Tool::Image => app.submit_image(),
        Tool::Recipe => app.submit_recipe(),
        Tool::Voice => app.toggle_voice_playback(),
        Tool::Chat => app.submit_chat(),
        Tool::Website => app.submit_website(),
        Tool::MobileUi => app.submit_mobile(),
        Tool::Chart => app.submit_chart(),
        Tool::ContentChecker => app.submit_analyze(),
        Tool::CodeExplainer => app.submit_explain_code(),
        Tool::LanguageDetector => app.submit_detect(),
    }
}

fn cycle_field(app: &mut App) {
    match app.active_tool {
        Tool::Image => app.image.field = (app.image.field + 1) % 3,
        Tool::Recipe => app.recipe.field = (app.recipe.field + 1) % 2,
        Tool::Voice => app.voice.field = (app.voice.field + 1) % 2,
        Tool::CodeExplainer => app.code.field = (app.code.field + 1) % 2,
        _ => {}
    }
}

fn is_selector_focused(app: &App) -> bool {
    match app.active_tool {
        Tool::Image => app.image.field > 0,
        Tool::CodeExplainer => app.code.field == 1,
        Tool::Voice => app.voice.field == 1,
        _ => false,
    }
}

fn voice_list_focused(app: &App) -> bool {
    app.active_tool == Tool::Voice && app.voice.field == 1
}

/// Step the value of the focused selector field.
fn adjust_selector(app: &mut App, step: i8) {
    match app.active_tool {
        Tool::Image if app.image.field == 1 => {
            let count = app.image.count as i8 + step;
            app.image.count = count.clamp(1, MAX_IMAGES as i8) as u8;
        }
        Tool::Image if app.image.field == 2 => {
            app.image.aspect_index = step_index(app.image.aspect_index, ASPECT_RATIOS.len(), step);
        }
        Tool::CodeExplainer if app.code.field == 1 => {
            app.code.language_index = step_index(app.code.language_index, LANGUAGES.len(), step);
        }
        _ => {}
    }
}

fn step_index(current: usize, len: usize, step: i8) -> usize {
    if step < 0 {
        current.checked_sub(1).unwrap_or(len - 1)
    } else {
        (current + 1) % len
    }
}

fn scroll_result(app: &mut App, step: i16) {
    let scroll = match app.active_tool {
        Tool::Recipe => &mut app.recipe.scroll,
        Tool::Chat => &mut app.chat.scroll,
        Tool::Website => &mut app.website.scroll,
        Tool::MobileUi => &mut app.mobile.scroll,
        Tool::Chart => &mut app.chart.scroll,
        Tool::ContentChecker => &mut app.content.scroll,
        Tool::CodeExplainer => &mut app.code.scroll,
        _ => return,
    };
    if step < 0 {
        *scroll = scroll.saturating_sub(step.unsigned_abs());
    } else {
        *scroll = scroll.saturating_add(step as u16);
    }
}

fn scroll_top(app: &mut App) {
    let scroll = match app.active_tool {
        Tool::Recipe => &mut app.recipe.scroll,
        Tool::Chat => &mut app.chat.scroll,
        Tool::Website => &mut app.website.scroll,
        Tool::MobileUi => &mut app.mobile.scroll,
        Tool::Chart => &mut app.chart.scroll,
        Tool::ContentChecker => &mut app.content.scroll,
        Tool::CodeExplainer => &mut app.code.scroll,
        _ => return,
    };
    *scroll = 0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_index_wraps_both_directions() {
        assert_eq!(step_index(0, 5, 1), 1);
        assert_eq!(step_index(4, 5, 1), 0);
        assert_eq!(step_index(0, 5, -1), 4);
        assert_eq!(step_index(3, 5, -1), 2);
    }
}
