//! System tray icon and menu
//!
//! Native menus have no sliders, so presence and message count are offered
//! as groups of check items with the current value checked. The same menu
//! doubles as the context menu of every bubble window.

use floatpet_core::config::{MAX_MESSAGE_COUNT, MAX_PRESENCE, MIN_MESSAGE_COUNT};
use floatpet_core::settings::{Settings, TextStyle, Tone};
use floatpet_core::SettingsStore;
use tauri::menu::{CheckMenuItem, Menu, MenuBuilder, SubmenuBuilder};
use tauri::tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent};
use tauri::{AppHandle, Manager, Wry};

use crate::app::AppState;
use crate::commands;
use crate::config::{PRESENCE_STEPS, TRAY_ID, TRAY_TOOLTIP};

const TRAY_ICON: tauri::image::Image<'_> = tauri::include_image!("icons/32x32.png");

const MENU_ID_EDGE_ADSORPTION: &str = "edge_adsorption";
const MENU_ID_MOUSE_FOLLOWING: &str = "mouse_following";
const MENU_ID_FIXED_POSITION: &str = "fixed_position";
const MENU_ID_RESET_POSITION: &str = "reset_position";
const MENU_ID_SETTINGS: &str = "settings";
const MENU_ID_ABOUT: &str = "about";
const MENU_ID_EXIT: &str = "exit";

/// Everything a tray menu click can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Presence(u8),
    MessageCount(u8),
    Style(TextStyle),
    Tone(Tone),
    ToggleEdgeAdsorption,
    ToggleMouseFollowing,
    ToggleFixedPosition,
    ResetPosition,
    OpenSettings,
    OpenAbout,
    Exit,
}

impl MenuAction {
    pub fn id(&self) -> String {
        match self {
            MenuAction::Presence(value) => format!("presence:{}", value),
            MenuAction::MessageCount(count) => format!("count:{}", count),
            MenuAction::Style(style) => format!("style:{}", style.key()),
            MenuAction::Tone(tone) => format!("tone:{}", tone.key()),
            MenuAction::ToggleEdgeAdsorption => MENU_ID_EDGE_ADSORPTION.to_string(),
            MenuAction::ToggleMouseFollowing => MENU_ID_MOUSE_FOLLOWING.to_string(),
            MenuAction::ToggleFixedPosition => MENU_ID_FIXED_POSITION.to_string(),
            MenuAction::ResetPosition => MENU_ID_RESET_POSITION.to_string(),
            MenuAction::OpenSettings => MENU_ID_SETTINGS.to_string(),
            MenuAction::OpenAbout => MENU_ID_ABOUT.to_string(),
            MenuAction::Exit => MENU_ID_EXIT.to_string(),
        }
    }

    pub fn parse(id: &str) -> Option<Self> {
        if let Some((group, value)) = id.split_once(':') {
            return match group {
                "presence" => value.parse().ok().map(MenuAction::Presence),
                "count" => value.parse().ok().map(MenuAction::MessageCount),
                "style" => value.parse().ok().map(MenuAction::Style),
                "tone" => value.parse().ok().map(MenuAction::Tone),
                _ => None,
            };
        }

        match id {
            MENU_ID_EDGE_ADSORPTION => Some(MenuAction::ToggleEdgeAdsorption),
            MENU_ID_MOUSE_FOLLOWING => Some(MenuAction::ToggleMouseFollowing),
            MENU_ID_FIXED_POSITION => Some(MenuAction::ToggleFixedPosition),
            MENU_ID_RESET_POSITION => Some(MenuAction::ResetPosition),
            MENU_ID_SETTINGS => Some(MenuAction::OpenSettings),
            MENU_ID_ABOUT => Some(MenuAction::OpenAbout),
            MENU_ID_EXIT => Some(MenuAction::Exit),
            _ => None,
        }
    }

    /// Apply a settings action to the store. Returns false for window actions.
    pub fn apply(self, settings: &SettingsStore) -> bool {
        let result = match self {
            MenuAction::Presence(value) => settings.set_presence(i32::from(value)),
            MenuAction::MessageCount(count) => settings.set_message_count(i32::from(count)),
            MenuAction::Style(style) => {
                settings.set_text_style(style);
                Ok(())
            }
            MenuAction::Tone(tone) => {
                settings.set_tone(tone);
                Ok(())
            }
            MenuAction::ToggleEdgeAdsorption => {
                settings.set_edge_adsorption(!settings.edge_adsorption());
                Ok(())
            }
            MenuAction::ToggleMouseFollowing => {
                settings.set_mouse_following(!settings.mouse_following());
                Ok(())
            }
            MenuAction::ToggleFixedPosition => {
                settings.set_fixed_position(!settings.fixed_position());
                Ok(())
            }
            MenuAction::ResetPosition => {
                settings.reset_position();
                Ok(())
            }
            MenuAction::OpenSettings | MenuAction::OpenAbout | MenuAction::Exit => return false,
        };

        if let Err(e) = result {
            tracing::warn!("Tray menu value rejected: {}", e);
        }
        true
    }
}

/// Presence step shown as checked for an arbitrary presence value
pub fn nearest_presence_step(presence: u8) -> u8 {
    let presence = presence.min(MAX_PRESENCE);
    PRESENCE_STEPS
        .iter()
        .copied()
        .min_by_key(|step| (i16::from(*step) - i16::from(presence)).abs())
        .unwrap_or(presence)
}

/// Tray menu and handles to every check item that mirrors a setting
pub struct TrayMenu {
    menu: Menu<Wry>,
    presence: Vec<(u8, CheckMenuItem<Wry>)>,
    counts: Vec<(u8, CheckMenuItem<Wry>)>,
    styles: Vec<(TextStyle, CheckMenuItem<Wry>)>,
    tones: Vec<(Tone, CheckMenuItem<Wry>)>,
    edge_adsorption: CheckMenuItem<Wry>,
    mouse_following: CheckMenuItem<Wry>,
    fixed_position: CheckMenuItem<Wry>,
}

fn check_item(
    app: &AppHandle,
    action: MenuAction,
    label: impl AsRef<str>,
) -> tauri::Result<CheckMenuItem<Wry>> {
    CheckMenuItem::with_id(app, action.id(), label, true, false, None::<&str>)
}

fn set_checked(item: &CheckMenuItem<Wry>, checked: bool) {
    if let Err(e) = item.set_checked(checked) {
        tracing::warn!("Failed to update tray check item: {}", e);
    }
}

impl TrayMenu {
    pub fn build(app: &AppHandle) -> tauri::Result<Self> {
        let presence = PRESENCE_STEPS
            .iter()
            .map(|&step| -> tauri::Result<_> {
                Ok((step, check_item(app, MenuAction::Presence(step), format!("{}%", step))?))
            })
            .collect::<tauri::Result<Vec<_>>>()?;

        let counts = (MIN_MESSAGE_COUNT..=MAX_MESSAGE_COUNT)
            .map(|count| -> tauri::Result<_> {
                Ok((count, check_item(app, MenuAction::MessageCount(count), count.to_string())?))
            })
            .collect::<tauri::Result<Vec<_>>>()?;

        let styles = TextStyle::ALL
            .into_iter()
            .map(|style| -> tauri::Result<_> {
                Ok((style, check_item(app, MenuAction::Style(style), style.label())?))
            })
            .collect::<tauri::Result<Vec<_>>>()?;

        let tones = Tone::ALL
            .into_iter()
            .map(|tone| -> tauri::Result<_> {
                Ok((tone, check_item(app, MenuAction::Tone(tone), tone.label())?))
            })
            .collect::<tauri::Result<Vec<_>>>()?;

        let edge_adsorption = check_item(app, MenuAction::ToggleEdgeAdsorption, "Edge adsorption")?;
        let mouse_following = check_item(app, MenuAction::ToggleMouseFollowing, "Follow mouse")?;
        let fixed_position = check_item(app, MenuAction::ToggleFixedPosition, "Fixed position")?;

        let mut presence_menu = SubmenuBuilder::new(app, "Presence");
        for (_, item) in &presence {
            presence_menu = presence_menu.item(item);
        }

        let mut count_menu = SubmenuBuilder::new(app, "Messages per batch");
        for (_, item) in &counts {
            count_menu = count_menu.item(item);
        }

        let mut style_menu = SubmenuBuilder::new(app, "Text style");
        for (_, item) in &styles {
            style_menu = style_menu.item(item);
        }

        let mut tone_menu = SubmenuBuilder::new(app, "Tone");
        for (_, item) in &tones {
            tone_menu = tone_menu.item(item);
        }

        let position_menu = SubmenuBuilder::new(app, "Position")
            .item(&edge_adsorption)
            .item(&mouse_following)
            .item(&fixed_position)
            .separator()
            .text(MENU_ID_RESET_POSITION, "Reset position")
            .build()?;

        let menu = MenuBuilder::new(app)
            .item(&presence_menu.build()?)
            .item(&count_menu.build()?)
            .item(&style_menu.build()?)
            .item(&tone_menu.build()?)
            .item(&position_menu)
            .separator()
            .text(MENU_ID_SETTINGS, "Settings...")
            .text(MENU_ID_ABOUT, "About")
            .separator()
            .text(MENU_ID_EXIT, "Exit")
            .build()?;

        Ok(Self {
            menu,
            presence,
            counts,
            styles,
            tones,
            edge_adsorption,
            mouse_following,
            fixed_position,
        })
    }

    pub fn menu(&self) -> &Menu<Wry> {
        &self.menu
    }

    /// Make every check item reflect `settings`
    pub fn sync(&self, settings: &Settings) {
        let step = nearest_presence_step(settings.presence);
        for (value, item) in &self.presence {
            set_checked(item, *value == step);
        }
        for (count, item) in &self.counts {
            set_checked(item, *count == settings.message_count);
        }
        for (style, item) in &self.styles {
            set_checked(item, *style == settings.text_style);
        }
        for (tone, item) in &self.tones {
            set_checked(item, *tone == settings.tone);
        }
        set_checked(&self.edge_adsorption, settings.edge_adsorption);
        set_checked(&self.mouse_following, settings.mouse_following);
        set_checked(&self.fixed_position, settings.fixed_position);
    }
}

/// Install the tray icon using the already built menu
pub fn setup_tray(app: &AppHandle, tray_menu: &TrayMenu) -> tauri::Result<()> {
    let _tray = TrayIconBuilder::with_id(TRAY_ID)
        .menu(tray_menu.menu())
        .icon(TRAY_ICON.clone())
        .tooltip(TRAY_TOOLTIP)
        .show_menu_on_left_click(false)
        .on_menu_event(|app, event| handle_menu_event(app, event.id().as_ref()))
        .on_tray_icon_event(|tray, event| {
            if let TrayIconEvent::Click {
                button: MouseButton::Left,
                button_state: MouseButtonState::Up,
                ..
            } = event
            {
                display_now(tray.app_handle());
            }
        })
        .build(app)?;

    Ok(())
}

fn display_now(app: &AppHandle) {
    let Some(state) = app.try_state::<AppState>() else {
        return;
    };

    commands::display_in_background(state.orchestrator.clone());
}

/// Handles clicks from the tray menu and from bubble context menus
fn handle_menu_event(app: &AppHandle, id: &str) {
    let Some(action) = MenuAction::parse(id) else {
        tracing::debug!("Ignoring unknown menu item: {}", id);
        return;
    };
    let Some(state) = app.try_state::<AppState>() else {
        return;
    };

    tracing::debug!("Tray menu action: {:?}", action);

    if action.apply(state.orchestrator.settings()) {
        // A click on an already checked item unchecks it without changing settings
        state.tray.sync(&state.orchestrator.settings().snapshot());
        return;
    }

    let result = match action {
        MenuAction::OpenSettings => commands::show_settings_window(app).map(|_| ()),
        MenuAction::OpenAbout => commands::show_about_window(app).map(|_| ()),
        MenuAction::Exit => {
            tracing::info!("Exit requested from tray");
            state.orchestrator.shutdown();
            app.exit(0);
            Ok(())
        }
        _ => Ok(()),
    };

    if let Err(e) = result {
        tracing::error!("Tray menu action failed: {}", e);
    }
}
