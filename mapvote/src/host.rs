//! The narrow contract the core consumes from the host game server
//!
//! The coordinator never talks to the engine directly: everything flows
//! through [`GameHost`]. The host implements this once and drives the core
//! from its own event hooks and a once-per-second scheduler.

/// Connection slot of a participant; one vote per slot.
pub type PlayerSlot = u32;

/// Console variable names the core reads and writes.
pub const CVAR_TIME_LIMIT: &str = "mp_timelimit";
pub const CVAR_MAX_ROUNDS: &str = "mp_maxrounds";
pub const CVAR_WIN_LIMIT: &str = "mp_winlimit";
pub const CVAR_WARMUP_PERIOD: &str = "mp_warmup_period";

/// Teams 0 (unassigned) and 1 (spectator) never play.
const LAST_NON_PLAYING_TEAM: u8 = 1;

/// Snapshot of a connected participant.
#[derive(Debug, Clone)]
pub struct PlayerInfo {
    pub slot: PlayerSlot,
    pub name: String,
    pub is_bot: bool,
    pub team: u8,
    pub is_valid: bool,
}

impl PlayerInfo {
    pub fn is_spectator(&self) -> bool {
        self.team <= LAST_NON_PLAYING_TEAM
    }
}

/// Identity of the currently loaded map as the engine reports it.
#[derive(Debug, Clone, Default)]
pub struct CurrentMap {
    /// Engine-loadable name, e.g. `de_mirage`
    pub name: String,
    /// Workshop id when the map was loaded from the workshop
    pub workshop_id: Option<String>,
}

/// One selectable row of a choice menu.
#[derive(Debug, Clone)]
pub struct MenuOption {
    /// Text shown to the player
    pub label: String,
    /// Value fed back into the command surface when picked
    pub value: String,
    pub enabled: bool,
}

/// A choice menu the host renders for one player.
///
/// `tag` identifies the owning subsystem so the core can tell its own open
/// menus apart from anything else the host has on screen.
#[derive(Debug, Clone)]
pub struct MenuSpec {
    pub tag: String,
    pub title: String,
    pub options: Vec<MenuOption>,
}

/// Host-engine surface consumed by the core.
///
/// All calls run on the host's logical thread; none may block.
pub trait GameHost {
    /// Enumerate connected participants (including bots and spectators).
    fn players(&self) -> Vec<PlayerInfo>;

    /// Identity of the currently loaded map.
    fn current_map(&self) -> CurrentMap;

    /// Engine clock in seconds. Monotonic within a map.
    fn game_time(&self) -> f64;

    fn cvar_f32(&self, name: &str) -> Option<f32>;
    fn cvar_i32(&self, name: &str) -> Option<i32>;
    fn set_cvar_f32(&mut self, name: &str, value: f32);
    fn set_cvar_i32(&mut self, name: &str, value: i32);

    /// Current score of every team, in no particular order.
    fn team_scores(&self) -> Vec<i32>;

    fn chat_all(&mut self, message: &str);
    fn chat_player(&mut self, slot: PlayerSlot, message: &str);

    /// Render a choice menu for one player, replacing any open menu.
    fn show_menu(&mut self, slot: PlayerSlot, menu: MenuSpec);
    /// Tag of the menu the player currently has open, if any.
    fn open_menu_tag(&self, slot: PlayerSlot) -> Option<String>;
    fn close_menu(&mut self, slot: PlayerSlot);

    /// Record the next level without changing it yet.
    fn set_next_level(&mut self, name: &str);
    /// Change the level now.
    fn change_level(&mut self, id: &str);
    /// Download-and-load path for workshop maps.
    fn load_workshop_map(&mut self, workshop_id: &str);
}

/// Participants counted toward quorum denominators: connected, human, and
/// (unless spectators are allowed) on a playing team.
pub fn eligible_players(host: &dyn GameHost, allow_spectators: bool) -> Vec<PlayerInfo> {
    host.players()
        .into_iter()
        .filter(|p| p.is_valid && !p.is_bot && (allow_spectators || !p.is_spectator()))
        .collect()
}
