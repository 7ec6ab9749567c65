use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Screen};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    Quit,
    /// Run `service.locate`(...) in the background
    LocateNearby,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Backspace, Char, Down, Enter, Esc, Left, Right, Tab, Up};

    // Global quit shortcuts
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }
    if key.code == Char('q') && key.modifiers.is_empty() {
        return Action::Quit;
    }

    let mut action = Action::None;

    match app.screen {
        Screen::TripPlanner => match key.code {
            Up | Char('k') => app.select_previous_category(),
            Down | Char('j') => app.select_next_category(),
            Char(character) => {
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT)
                {
                    app.push_quantity_char(character);
                }
            }
            Backspace => app.pop_quantity_char(),
            Tab | Right => {
                app.screen = Screen::NearbyCenters;
            }
            Enter => {
                app.screen = Screen::NearbyCenters;
                action = Action::LocateNearby;
            }
            _ => {}
        },

        Screen::NearbyCenters => match key.code {
            Up | Char('k') => app.select_previous_facility(),
            Down | Char('j') => app.select_next_facility(),
            Enter | Char('r') => {
                action = Action::LocateNearby;
            }
            Left | Esc | Tab | Char('b') => {
                app.screen = Screen::TripPlanner;
            }
            _ => {}
        },
    }
    action
}
