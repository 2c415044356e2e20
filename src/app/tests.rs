use std::time::{Duration, Instant};

use super::*;
use crate::library::{Playlist, Track};
use crate::store::{RecentlyPlayed, UserPlaylists};

fn t(name: &str, artist: Option<&str>) -> Track {
    let track = Track::new(name.to_lowercase(), name);
    match artist {
        Some(a) => track.with_artist(a),
        None => track,
    }
}

fn app_with_library(tracks: Vec<Track>) -> App {
    let mut app = App::new(RecentlyPlayed::new(20), UserPlaylists::default());
    app.set_library(tracks);
    app.switch_to(Screen::Library);
    app
}

#[test]
fn screens_cycle_in_tab_order() {
    assert_eq!(Screen::Home.next(), Screen::Library);
    assert_eq!(Screen::Settings.next(), Screen::Home);
    assert_eq!(Screen::Home.prev(), Screen::Settings);
    assert_eq!(Screen::Playlists.index(), 3);
}

#[test]
fn filter_is_case_insensitive_substring_over_name_and_artist() {
    let mut app = app_with_library(vec![
        t("Around the World", Some("Daft Punk")),
        t("Paranoid", Some("Black Sabbath")),
        t("Punk Rock Song", None),
    ]);

    app.filter_query = "PUNK".into();
    assert_eq!(app.visible_library(), vec![0, 2]);

    app.filter_query = "sabb".into();
    assert_eq!(app.visible_library(), vec![1]);

    // Not a subsequence matcher.
    app.filter_query = "atw".into();
    assert!(app.visible_library().is_empty());
}

#[test]
fn typing_filter_keeps_cursor_on_a_visible_row() {
    let mut app = app_with_library(vec![t("Alpha", None), t("Beta", None), t("Gamma", None)]);
    let queue = Playlist::new();
    app.select_last(app.rows(&queue));
    assert_eq!(app.selected(), 2);

    app.enter_filter_mode();
    assert_eq!(app.input, InputMode::Filter);
    app.push_filter_char('b');
    assert_eq!(app.selected(), 0);
    assert_eq!(app.selected_track(&queue).map(|t| t.name.as_str()), Some("Beta"));

    app.clear_filter();
    assert_eq!(app.input, InputMode::Normal);
    assert_eq!(app.rows(&queue), 3);
}

#[test]
fn selection_wraps_and_is_kept_per_screen() {
    let mut app = app_with_library(vec![t("A", None), t("B", None)]);
    let queue = Playlist::from_tracks(vec![t("Q1", None), t("Q2", None), t("Q3", None)]);

    app.select_prev(app.rows(&queue));
    assert_eq!(app.selected(), 1);
    app.select_next(app.rows(&queue));
    assert_eq!(app.selected(), 0);

    app.switch_to(Screen::Queue);
    app.select_prev(app.rows(&queue));
    assert_eq!(app.selected_track(&queue).map(|t| t.name.as_str()), Some("Q3"));

    app.switch_to(Screen::Library);
    assert_eq!(app.selected(), 0);
}

#[test]
fn selection_on_empty_screen_is_a_no_op() {
    let mut app = App::new(RecentlyPlayed::new(5), UserPlaylists::default());
    app.select_next(0);
    app.select_prev(0);
    assert_eq!(app.selected(), 0);
    assert!(app.selected_track(&Playlist::new()).is_none());
}

#[test]
fn clamp_selection_follows_shrinking_lists() {
    let mut app = app_with_library(vec![]);
    app.switch_to(Screen::Queue);
    app.select_last(4);
    app.clamp_selection(2);
    assert_eq!(app.selected(), 1);
    app.clamp_selection(0);
    assert_eq!(app.selected(), 0);
}

#[test]
fn home_lists_a_bounded_slice_of_recent_tracks() {
    let mut recent = RecentlyPlayed::new(20);
    for name in ["A", "B", "C", "D"] {
        recent.push(t(name, None));
    }
    let mut app = App::new(recent, UserPlaylists::default());
    app.home_recent_count = 2;

    let names: Vec<&str> = app.home_tracks().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["D", "C"]);
}

#[test]
fn playlists_screen_opens_and_closes_a_playlist() {
    let mut playlists = UserPlaylists::default();
    playlists.create("Empty").unwrap();
    let id = playlists
        .save_queue("Road trip", &[t("One", None), t("Two", None)])
        .unwrap()
        .unwrap()
        .id
        .clone();

    let mut app = App::new(RecentlyPlayed::new(20), playlists);
    let queue = Playlist::new();
    app.switch_to(Screen::Playlists);
    assert_eq!(app.rows(&queue), 2);

    app.select_next(app.rows(&queue));
    assert_eq!(app.selected_playlist().map(|p| p.id.as_str()), Some(id.as_str()));
    assert!(app.open_selected_playlist());
    assert_eq!(app.rows(&queue), 2);
    assert_eq!(app.selected(), 0);
    assert!(app.selected_playlist().is_none());

    app.select_next(app.rows(&queue));
    assert_eq!(app.selected_track(&queue).map(|t| t.name.as_str()), Some("Two"));

    app.close_playlist();
    assert_eq!(app.selected(), 1);
}

#[test]
fn naming_hands_out_target_and_text_once() {
    let mut app = App::new(RecentlyPlayed::new(20), UserPlaylists::default());
    app.begin_naming(NameTarget::SaveQueue);
    for c in "Mix".chars() {
        app.push_name_char(c);
    }
    app.push_name_char('!');
    app.pop_name_char();

    assert_eq!(app.take_name(), Some((NameTarget::SaveQueue, "Mix".to_string())));
    assert_eq!(app.input, InputMode::Normal);
    assert_eq!(app.take_name(), None);

    app.begin_naming(NameTarget::NewPlaylist);
    app.push_name_char('x');
    app.cancel_naming();
    assert_eq!(app.take_name(), None);
}

#[test]
fn scrub_shadows_until_commit() {
    let start = Instant::now();
    let mut scrub = Scrub::new(Duration::from_millis(500));
    let total = Duration::from_secs(100);

    scrub.adjust(Duration::from_secs(10), total, 5, start);
    scrub.adjust(Duration::from_secs(11), total, 5, start + Duration::from_millis(200));

    assert!(scrub.is_active());
    assert_eq!(scrub.display(Duration::from_secs(11)), Duration::from_secs(20));
    assert_eq!(scrub.poll_commit(start + Duration::from_millis(600)), None);

    let committed = scrub.poll_commit(start + Duration::from_millis(700));
    assert_eq!(committed, Some(Duration::from_secs(20)));
    assert!(!scrub.is_active());
    assert_eq!(scrub.display(Duration::from_secs(12)), Duration::from_secs(12));
    assert_eq!(scrub.poll_commit(start + Duration::from_secs(5)), None);
}

#[test]
fn scrub_clamps_to_track_bounds() {
    let now = Instant::now();
    let mut scrub = Scrub::new(Duration::ZERO);

    scrub.adjust(Duration::from_secs(2), Duration::from_secs(30), -5, now);
    assert_eq!(scrub.display(Duration::ZERO), Duration::ZERO);

    scrub.adjust(Duration::ZERO, Duration::from_secs(30), 45, now);
    assert_eq!(scrub.display(Duration::ZERO), Duration::from_secs(30));

    scrub.cancel();
    assert!(!scrub.is_active());
    assert_eq!(scrub.poll_commit(now), None);
}
