//! Plain-text views of the place list, markers and editor.

use placemark_core::map::{bounds, format_position};
use placemark_core::{AppState, Editor, EditorPhase, Marker, TileSource};

pub fn places(state: &AppState) {
    if !state.show_list {
        println!("(list hidden; `toggle-list` to show {} places)", state.locations.len());
        return;
    }
    if state.locations.is_empty() {
        println!("no places yet");
        return;
    }
    for place in &state.locations {
        let locality = place
            .meta
            .as_ref()
            .and_then(|meta| meta.locality())
            .map(|text| format!(" [{text}]"))
            .unwrap_or_default();
        println!(
            "{}  {}{}  ({})",
            short_id(&place.id),
            place.title,
            locality,
            format_position(place.coordinates())
        );
        if !place.notes.trim().is_empty() {
            println!("          {}", place.notes.trim());
        }
    }
}

pub fn markers(markers: &[Marker], state: &AppState) {
    if markers.is_empty() {
        println!("map is empty");
        return;
    }
    if let Some(bounds) = bounds(&state.locations) {
        println!(
            "view: S {:.5} W {:.5} N {:.5} E {:.5} (center {})",
            bounds.south,
            bounds.west,
            bounds.north,
            bounds.east,
            format_position(bounds.center())
        );
    }
    for marker in markers {
        println!("* {} @ {}", short_id(&marker.place_id), marker.popup.position);
        println!("    {}", marker.popup.title);
        if let Some(locality) = marker.popup.locality.as_deref() {
            println!("    {locality}");
        }
        if let Some(notes) = marker.popup.notes.as_deref() {
            println!("    {notes}");
        }
    }
}

pub fn status(state: &AppState, editor: &Editor, tiles: &TileSource) {
    println!(
        "collecting={} list={} places={}",
        on_off(state.is_collecting),
        on_off(state.show_list),
        state.locations.len()
    );
    draft(editor);
    println!("tiles: {}", tiles.url_template);
    println!("attribution: {}", tiles.attribution);
}

pub fn draft(editor: &Editor) {
    let Some(draft) = editor.draft() else {
        println!("editor: closed");
        return;
    };
    let phase = match editor.phase() {
        EditorPhase::Creating => "new place",
        EditorPhase::Editing => "editing",
        EditorPhase::Closed => "closed",
    };
    let loading = if draft.is_loading() { " (looking up address...)" } else { "" };
    println!(
        "editor: {} at {}{}",
        phase,
        format_position(draft.coordinates()),
        loading
    );
    println!("  title: {}", draft.title);
    println!("  notes: {}", draft.notes);
}

pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}
