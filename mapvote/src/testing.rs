//! In-memory host implementation for tests
//!
//! Records every engine-facing call so tests can assert on the exact
//! sequence of chat lines, menus, and level-change commands the core
//! produced. The clock only moves when a test advances it.

use std::collections::HashMap;

use crate::host::{CurrentMap, GameHost, MenuSpec, PlayerInfo, PlayerSlot};

/// Scripted [`GameHost`] double.
#[derive(Debug, Default)]
pub struct FakeHost {
    players: Vec<PlayerInfo>,
    map: CurrentMap,
    time: f64,
    cvars_f32: HashMap<String, f32>,
    cvars_i32: HashMap<String, i32>,
    team_scores: Vec<i32>,
    chat: Vec<(Option<PlayerSlot>, String)>,
    open_menus: HashMap<PlayerSlot, MenuSpec>,
    engine_commands: Vec<String>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            map: CurrentMap {
                name: "de_dust2".to_string(),
                workshop_id: None,
            },
            ..Self::default()
        }
    }

    pub fn add_player(&mut self, slot: PlayerSlot, name: &str, team: u8) {
        self.players.push(PlayerInfo {
            slot,
            name: name.to_string(),
            is_bot: false,
            team,
            is_valid: true,
        });
    }

    pub fn add_bot(&mut self, slot: PlayerSlot, name: &str, team: u8) {
        self.players.push(PlayerInfo {
            slot,
            name: name.to_string(),
            is_bot: true,
            team,
            is_valid: true,
        });
    }

    pub fn remove_player(&mut self, slot: PlayerSlot) {
        self.players.retain(|p| p.slot != slot);
        self.open_menus.remove(&slot);
    }

    pub fn set_map(&mut self, name: &str) {
        self.map = CurrentMap {
            name: name.to_string(),
            workshop_id: None,
        };
    }

    pub fn set_workshop_map(&mut self, name: &str, workshop_id: &str) {
        self.map = CurrentMap {
            name: name.to_string(),
            workshop_id: Some(workshop_id.to_string()),
        };
    }

    pub fn advance_time(&mut self, seconds: f64) {
        self.time += seconds;
    }

    pub fn set_team_scores(&mut self, scores: Vec<i32>) {
        self.team_scores = scores;
    }

    /// Every chat line sent so far; `None` slot means broadcast.
    pub fn chat(&self) -> &[(Option<PlayerSlot>, String)] {
        &self.chat
    }

    pub fn broadcasts(&self) -> Vec<&str> {
        self.chat
            .iter()
            .filter(|(slot, _)| slot.is_none())
            .map(|(_, line)| line.as_str())
            .collect()
    }

    pub fn open_menu(&self, slot: PlayerSlot) -> Option<&MenuSpec> {
        self.open_menus.get(&slot)
    }

    /// Level-change calls in order, formatted as `"<call> <arg>"`.
    pub fn engine_commands(&self) -> &[String] {
        &self.engine_commands
    }
}

impl GameHost for FakeHost {
    fn players(&self) -> Vec<PlayerInfo> {
        self.players.clone()
    }

    fn current_map(&self) -> CurrentMap {
        self.map.clone()
    }

    fn game_time(&self) -> f64 {
        self.time
    }

    fn cvar_f32(&self, name: &str) -> Option<f32> {
        self.cvars_f32.get(name).copied()
    }

    fn cvar_i32(&self, name: &str) -> Option<i32> {
        self.cvars_i32.get(name).copied()
    }

    fn set_cvar_f32(&mut self, name: &str, value: f32) {
        self.cvars_f32.insert(name.to_string(), value);
    }

    fn set_cvar_i32(&mut self, name: &str, value: i32) {
        self.cvars_i32.insert(name.to_string(), value);
    }

    fn team_scores(&self) -> Vec<i32> {
        self.team_scores.clone()
    }

    fn chat_all(&mut self, message: &str) {
        self.chat.push((None, message.to_string()));
    }

    fn chat_player(&mut self, slot: PlayerSlot, message: &str) {
        self.chat.push((Some(slot), message.to_string()));
    }

    fn show_menu(&mut self, slot: PlayerSlot, menu: MenuSpec) {
        self.open_menus.insert(slot, menu);
    }

    fn open_menu_tag(&self, slot: PlayerSlot) -> Option<String> {
        self.open_menus.get(&slot).map(|m| m.tag.clone())
    }

    fn close_menu(&mut self, slot: PlayerSlot) {
        self.open_menus.remove(&slot);
    }

    fn set_next_level(&mut self, name: &str) {
        self.engine_commands.push(format!("set_next_level {name}"));
    }

    fn change_level(&mut self, id: &str) {
        self.engine_commands.push(format!("change_level {id}"));
    }

    fn load_workshop_map(&mut self, workshop_id: &str) {
        self.engine_commands
            .push(format!("load_workshop_map {workshop_id}"));
    }
}
