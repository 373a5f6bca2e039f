// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::filter::{Catalog, position_of};
use crate::ids::ItemId;
use crate::location::parse_card_fragment;
use crate::model::{AppMode, GalleryItem, ImageItem, StatusCard, ViewKind};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Closed,
    Open(ItemId),
}

impl Selection {
    pub fn id(&self) -> Option<&ItemId> {
        match self {
            Self::Closed => None,
            Self::Open(id) => Some(id),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }
}

/// Signals the overlay listens for while an item is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKey {
    Escape,
    ArrowLeft,
    ArrowRight,
}

impl OverlayKey {
    pub fn command(self) -> ViewCommand {
        match self {
            Self::Escape => ViewCommand::Close,
            Self::ArrowLeft => ViewCommand::Prev,
            Self::ArrowRight => ViewCommand::Next,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    SetQuery(String),
    PushQuery(char),
    PopQuery,
    ClearQuery,
    SetTag(Option<String>),
    CycleTag(isize),
    OpenAt(usize),
    OpenId(ItemId),
    Next,
    Prev,
    Close,
    SelectTagFromOverlay(String),
    SyncFragment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    QueryChanged(String),
    TagChanged(Option<String>),
    SelectionChanged(Option<ItemId>),
}

/// Search text, tag filter and open item for one view. The open item is
/// tracked by id; its position is derived from the filtered list when
/// needed. `anchor` is the last known position of the open item and wins
/// while it still holds that id, so repeated ids stay reachable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    pub query: String,
    pub active_tag: Option<String>,
    pub selection: Selection,
    anchor: usize,
}

impl ViewState {
    pub fn filtered<'a, T: GalleryItem>(&self, catalog: &'a Catalog<T>) -> Vec<&'a T> {
        catalog.filtered(&self.query, self.active_tag.as_deref())
    }

    pub fn open_index<T: GalleryItem>(&self, catalog: &Catalog<T>) -> Option<usize> {
        self.resolve(&self.filtered(catalog))
    }

    pub fn selected<'a, T: GalleryItem>(&self, catalog: &'a Catalog<T>) -> Option<&'a T> {
        let filtered = self.filtered(catalog);
        let index = self.resolve(&filtered)?;
        Some(filtered[index])
    }

    fn resolve<T: GalleryItem>(&self, filtered: &[&T]) -> Option<usize> {
        let id = self.selection.id()?;
        match filtered.get(self.anchor) {
            Some(item) if item.id() == id => Some(self.anchor),
            _ => position_of(filtered, id),
        }
    }

    pub fn apply<T: GalleryItem>(
        &mut self,
        catalog: &Catalog<T>,
        command: ViewCommand,
    ) -> Vec<ViewEvent> {
        match command {
            ViewCommand::SetQuery(query) => self.set_query(catalog, query),
            ViewCommand::PushQuery(ch) => {
                let mut query = self.query.clone();
                query.push(ch);
                self.set_query(catalog, query)
            }
            ViewCommand::PopQuery => {
                let mut query = self.query.clone();
                query.pop();
                self.set_query(catalog, query)
            }
            ViewCommand::ClearQuery => self.set_query(catalog, String::new()),
            ViewCommand::SetTag(tag) => self.set_tag(catalog, tag),
            ViewCommand::CycleTag(delta) => {
                let tag = cycle_tag(catalog.tags(), self.active_tag.as_deref(), delta);
                self.set_tag(catalog, tag)
            }
            ViewCommand::OpenAt(index) => {
                let id = self
                    .filtered(catalog)
                    .get(index)
                    .map(|item| item.id().clone());
                match id {
                    Some(id) => self.open(id, index),
                    None => Vec::new(),
                }
            }
            ViewCommand::OpenId(id) => {
                if self.selection.id() == Some(&id) && self.open_index(catalog).is_some() {
                    return Vec::new();
                }
                match position_of(&self.filtered(catalog), &id) {
                    Some(index) => self.open(id, index),
                    None => self.select(Selection::Closed),
                }
            }
            ViewCommand::Next => self.step(catalog, 1),
            ViewCommand::Prev => self.step(catalog, -1),
            ViewCommand::Close => self.select(Selection::Closed),
            ViewCommand::SelectTagFromOverlay(tag) => {
                let mut events = self.select(Selection::Closed);
                events.extend(self.set_tag(catalog, Some(tag)));
                events
            }
            ViewCommand::SyncFragment(fragment) => match parse_card_fragment(&fragment) {
                Some(id) => self.apply(catalog, ViewCommand::OpenId(id)),
                None => self.select(Selection::Closed),
            },
        }
    }

    /// Keyboard bridge for the detail overlay. Ignored while closed.
    pub fn overlay_key<T: GalleryItem>(
        &mut self,
        catalog: &Catalog<T>,
        key: OverlayKey,
    ) -> Vec<ViewEvent> {
        if !self.selection.is_open() {
            return Vec::new();
        }
        self.apply(catalog, key.command())
    }

    fn set_query<T: GalleryItem>(&mut self, catalog: &Catalog<T>, query: String) -> Vec<ViewEvent> {
        if query == self.query {
            return Vec::new();
        }
        self.query = query;
        let mut events = vec![ViewEvent::QueryChanged(self.query.clone())];
        events.extend(self.revalidate(catalog));
        events
    }

    fn set_tag<T: GalleryItem>(
        &mut self,
        catalog: &Catalog<T>,
        tag: Option<String>,
    ) -> Vec<ViewEvent> {
        if tag == self.active_tag {
            return Vec::new();
        }
        self.active_tag = tag;
        let mut events = vec![ViewEvent::TagChanged(self.active_tag.clone())];
        events.extend(self.revalidate(catalog));
        events
    }

    // The filtered list just changed; keep the open item only if it is
    // still listed.
    fn revalidate<T: GalleryItem>(&mut self, catalog: &Catalog<T>) -> Vec<ViewEvent> {
        if !self.selection.is_open() {
            return Vec::new();
        }
        match self.open_index(catalog) {
            Some(index) => {
                self.anchor = index;
                Vec::new()
            }
            None => self.select(Selection::Closed),
        }
    }

    fn step<T: GalleryItem>(&mut self, catalog: &Catalog<T>, delta: isize) -> Vec<ViewEvent> {
        let filtered = self.filtered(catalog);
        let Some(current) = self.resolve(&filtered) else {
            return Vec::new();
        };
        let len = filtered.len() as isize;
        let next = (current as isize + delta).rem_euclid(len) as usize;
        let next_id = filtered[next].id().clone();
        self.open(next_id, next)
    }

    // A move between repeated ids changes only the anchor, and still counts
    // as a selection change.
    fn open(&mut self, id: ItemId, index: usize) -> Vec<ViewEvent> {
        let unchanged = self.selection.id() == Some(&id) && self.anchor == index;
        self.anchor = index;
        if unchanged {
            return Vec::new();
        }
        self.selection = Selection::Open(id);
        vec![ViewEvent::SelectionChanged(self.selection.id().cloned())]
    }

    fn select(&mut self, selection: Selection) -> Vec<ViewEvent> {
        if selection == self.selection {
            return Vec::new();
        }
        self.selection = selection;
        vec![ViewEvent::SelectionChanged(self.selection.id().cloned())]
    }
}

/// Steps through `[all, tags...]` with wraparound.
fn cycle_tag(tags: &[String], current: Option<&str>, delta: isize) -> Option<String> {
    let len = tags.len() as isize + 1;
    let position = match current {
        None => 0,
        Some(tag) => tags
            .iter()
            .position(|candidate| candidate == tag)
            .map_or(0, |index| index as isize + 1),
    };
    let next = (position + delta).rem_euclid(len);
    if next == 0 {
        None
    } else {
        tags.get(next as usize - 1).cloned()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Catalogs {
    pub images: Catalog<ImageItem>,
    pub cards: Catalog<StatusCard>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub active_view: ViewKind,
    pub images: ViewState,
    pub cards: ViewState,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Browse,
            active_view: ViewKind::Images,
            images: ViewState::default(),
            cards: ViewState::default(),
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextView,
    PrevView,
    ShowView(ViewKind),
    EnterSearch,
    ExitSearch,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    ViewChanged(ViewKind),
    View(ViewKind, ViewEvent),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn view(&self, kind: ViewKind) -> &ViewState {
        match kind {
            ViewKind::Images => &self.images,
            ViewKind::Cards => &self.cards,
        }
    }

    pub fn view_mut(&mut self, kind: ViewKind) -> &mut ViewState {
        match kind {
            ViewKind::Images => &mut self.images,
            ViewKind::Cards => &mut self.cards,
        }
    }

    pub fn active(&self) -> &ViewState {
        self.view(self.active_view)
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextView => self.rotate_view(1),
            AppCommand::PrevView => self.rotate_view(-1),
            AppCommand::ShowView(view) => {
                if view == self.active_view {
                    return Vec::new();
                }
                self.active_view = view;
                vec![AppEvent::ViewChanged(view)]
            }
            AppCommand::EnterSearch => {
                self.mode = AppMode::Search;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::ExitSearch => {
                self.mode = AppMode::Browse;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    /// Applies a view command to `kind`, which need not be the active view.
    pub fn dispatch_view(
        &mut self,
        catalogs: &Catalogs,
        kind: ViewKind,
        command: ViewCommand,
    ) -> Vec<AppEvent> {
        let events = match kind {
            ViewKind::Images => self.images.apply(&catalogs.images, command),
            ViewKind::Cards => self.cards.apply(&catalogs.cards, command),
        };
        self.wrap_view_events(kind, events)
    }

    pub fn dispatch_overlay_key(
        &mut self,
        catalogs: &Catalogs,
        kind: ViewKind,
        key: OverlayKey,
    ) -> Vec<AppEvent> {
        let events = match kind {
            ViewKind::Images => self.images.overlay_key(&catalogs.images, key),
            ViewKind::Cards => self.cards.overlay_key(&catalogs.cards, key),
        };
        self.wrap_view_events(kind, events)
    }

    fn wrap_view_events(&mut self, kind: ViewKind, events: Vec<ViewEvent>) -> Vec<AppEvent> {
        let mut wrapped = Vec::with_capacity(events.len() + 1);
        let mut status = None;
        for event in events {
            if let ViewEvent::TagChanged(tag) = &event {
                status = Some(match tag {
                    Some(tag) => format!("tag #{tag}"),
                    None => "all tags".to_owned(),
                });
            }
            wrapped.push(AppEvent::View(kind, event));
        }
        if let Some(status) = status {
            wrapped.push(self.set_status(&status));
        }
        wrapped
    }

    fn rotate_view(&mut self, delta: isize) -> Vec<AppEvent> {
        let views = ViewKind::ALL;
        let current = views
            .iter()
            .position(|view| *view == self.active_view)
            .unwrap_or(0) as isize;
        let len = views.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.active_view = views[next];
        vec![AppEvent::ViewChanged(self.active_view)]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AppCommand, AppEvent, AppState, Catalogs, OverlayKey, Selection, ViewCommand, ViewEvent,
        ViewState, cycle_tag,
    };
    use crate::{AppMode, Catalog, ImageItem, ItemId, ViewKind};

    fn image(id: &str, title: &str, tags: &[&str]) -> ImageItem {
        ImageItem {
            id: ItemId::new(id),
            title: title.to_owned(),
            src: String::new(),
            alt: None,
            tags: tags.iter().map(|tag| (*tag).to_owned()).collect(),
            notes: None,
            owner: None,
            created: None,
        }
    }

    fn catalog() -> Catalog<ImageItem> {
        Catalog::new(vec![
            image("a", "Red Fox", &["animal", "red"]),
            image("b", "Blue Jay", &["animal", "blue"]),
            image("c", "Red Barn", &["building", "red"]),
        ])
    }

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_owned()).collect()
    }

    #[test]
    fn open_at_out_of_range_is_ignored() {
        let catalog = catalog();
        let mut view = ViewState::default();
        assert!(view.apply(&catalog, ViewCommand::OpenAt(9)).is_empty());
        assert_eq!(view.selection, Selection::Closed);
    }

    #[test]
    fn next_and_prev_wrap_over_filtered_list() {
        let catalog = catalog();
        let mut view = ViewState {
            query: "red".to_owned(),
            ..ViewState::default()
        };
        view.apply(&catalog, ViewCommand::OpenAt(1));
        assert_eq!(view.selection, Selection::Open(ItemId::new("c")));

        view.apply(&catalog, ViewCommand::Next);
        assert_eq!(view.selection, Selection::Open(ItemId::new("a")));

        view.apply(&catalog, ViewCommand::Prev);
        assert_eq!(view.selection, Selection::Open(ItemId::new("c")));
    }

    #[test]
    fn next_while_closed_is_noop() {
        let catalog = catalog();
        let mut view = ViewState::default();
        assert!(view.apply(&catalog, ViewCommand::Next).is_empty());
        assert!(view.apply(&catalog, ViewCommand::Prev).is_empty());
        assert_eq!(view.selection, Selection::Closed);
    }

    #[test]
    fn single_item_next_keeps_selection_without_event() {
        let catalog = Catalog::new(vec![image("only", "Solo", &[])]);
        let mut view = ViewState::default();
        view.apply(&catalog, ViewCommand::OpenAt(0));
        assert!(view.apply(&catalog, ViewCommand::Next).is_empty());
        assert_eq!(view.selection, Selection::Open(ItemId::new("only")));
    }

    fn repeated_ids() -> Catalog<ImageItem> {
        Catalog::new(vec![
            image("a", "Lantern", &["night"]),
            image("dup", "Koi", &["water"]),
            image("dup", "Koi again", &["water", "night"]),
            image("b", "Heron", &["water"]),
        ])
    }

    #[test]
    fn next_walks_past_repeated_ids() {
        let catalog = repeated_ids();
        let mut view = ViewState::default();
        view.apply(&catalog, ViewCommand::OpenAt(1));

        let mut visited = Vec::new();
        for _ in 0..4 {
            view.apply(&catalog, ViewCommand::Next);
            visited.push(view.open_index(&catalog));
        }
        assert_eq!(visited, vec![Some(2), Some(3), Some(0), Some(1)]);
    }

    #[test]
    fn step_between_repeated_ids_reports_selection_change() {
        let catalog = repeated_ids();
        let mut view = ViewState::default();
        view.apply(&catalog, ViewCommand::OpenAt(2));

        let events = view.apply(&catalog, ViewCommand::Prev);
        assert_eq!(
            events,
            vec![ViewEvent::SelectionChanged(Some(ItemId::new("dup")))]
        );
        assert_eq!(view.open_index(&catalog), Some(1));
        assert_eq!(
            view.selected(&catalog).map(|item| item.title.as_str()),
            Some("Koi")
        );
    }

    #[test]
    fn filter_change_re_resolves_repeated_id_position() {
        let catalog = repeated_ids();
        let mut view = ViewState::default();
        view.apply(&catalog, ViewCommand::OpenAt(2));

        view.apply(&catalog, ViewCommand::SetTag(Some("night".to_owned())));
        assert_eq!(view.open_index(&catalog), Some(1));
        view.apply(&catalog, ViewCommand::Next);
        assert_eq!(view.selection, Selection::Open(ItemId::new("a")));
    }

    #[test]
    fn query_change_keeps_open_item_that_still_matches() {
        let catalog = catalog();
        let mut view = ViewState::default();
        view.apply(&catalog, ViewCommand::OpenAt(0));

        let events = view.apply(&catalog, ViewCommand::SetQuery("fox".to_owned()));
        assert_eq!(events, vec![ViewEvent::QueryChanged("fox".to_owned())]);
        assert_eq!(view.selection, Selection::Open(ItemId::new("a")));
        assert_eq!(view.open_index(&catalog), Some(0));
    }

    #[test]
    fn query_change_closes_item_that_no_longer_matches() {
        let catalog = catalog();
        let mut view = ViewState::default();
        view.apply(&catalog, ViewCommand::OpenAt(1));

        let events = view.apply(&catalog, ViewCommand::SetQuery("barn".to_owned()));
        assert_eq!(
            events,
            vec![
                ViewEvent::QueryChanged("barn".to_owned()),
                ViewEvent::SelectionChanged(None),
            ]
        );
        assert_eq!(view.selection, Selection::Closed);
    }

    #[test]
    fn push_and_pop_query_edit_in_place() {
        let catalog = catalog();
        let mut view = ViewState::default();
        view.apply(&catalog, ViewCommand::PushQuery('j'));
        view.apply(&catalog, ViewCommand::PushQuery('a'));
        assert_eq!(view.query, "ja");
        assert_eq!(view.filtered(&catalog).len(), 1);

        view.apply(&catalog, ViewCommand::PopQuery);
        assert_eq!(view.query, "j");
        view.apply(&catalog, ViewCommand::ClearQuery);
        assert_eq!(view.query, "");
    }

    #[test]
    fn select_tag_from_overlay_closes_and_filters() {
        let catalog = catalog();
        let mut view = ViewState::default();
        view.apply(&catalog, ViewCommand::OpenAt(0));

        let events = view.apply(
            &catalog,
            ViewCommand::SelectTagFromOverlay("red".to_owned()),
        );
        assert_eq!(
            events,
            vec![
                ViewEvent::SelectionChanged(None),
                ViewEvent::TagChanged(Some("red".to_owned())),
            ]
        );
        assert_eq!(view.selection, Selection::Closed);
        assert_eq!(view.filtered(&catalog).len(), 2);
    }

    #[test]
    fn open_id_outside_filter_resolves_to_closed() {
        let catalog = catalog();
        let mut view = ViewState {
            active_tag: Some("blue".to_owned()),
            ..ViewState::default()
        };
        view.apply(&catalog, ViewCommand::OpenId(ItemId::new("a")));
        assert_eq!(view.selection, Selection::Closed);
        assert!(view.selected(&catalog).is_none());

        view.apply(&catalog, ViewCommand::OpenId(ItemId::new("b")));
        assert_eq!(
            view.selected(&catalog).map(|item| item.title.as_str()),
            Some("Blue Jay")
        );
    }

    #[test]
    fn sync_fragment_opens_and_closes() {
        let catalog = catalog();
        let mut view = ViewState::default();
        view.apply(&catalog, ViewCommand::SyncFragment("card-b".to_owned()));
        assert_eq!(view.selection, Selection::Open(ItemId::new("b")));

        view.apply(&catalog, ViewCommand::SyncFragment("card-zzz".to_owned()));
        assert_eq!(view.selection, Selection::Closed);

        view.apply(&catalog, ViewCommand::SyncFragment("card-a".to_owned()));
        view.apply(&catalog, ViewCommand::SyncFragment(String::new()));
        assert_eq!(view.selection, Selection::Closed);
    }

    #[test]
    fn overlay_keys_are_ignored_while_closed() {
        let catalog = catalog();
        let mut view = ViewState::default();
        assert!(
            view.overlay_key(&catalog, OverlayKey::ArrowRight)
                .is_empty()
        );

        view.apply(&catalog, ViewCommand::OpenAt(0));
        view.overlay_key(&catalog, OverlayKey::ArrowLeft);
        assert_eq!(view.selection, Selection::Open(ItemId::new("c")));
        view.overlay_key(&catalog, OverlayKey::Escape);
        assert_eq!(view.selection, Selection::Closed);
    }

    #[test]
    fn cycle_tag_walks_all_then_tags() {
        let tags = tags(&["animal", "blue"]);
        assert_eq!(cycle_tag(&tags, None, 1).as_deref(), Some("animal"));
        assert_eq!(cycle_tag(&tags, Some("animal"), 1).as_deref(), Some("blue"));
        assert_eq!(cycle_tag(&tags, Some("blue"), 1), None);
        assert_eq!(cycle_tag(&tags, None, -1).as_deref(), Some("blue"));
        assert_eq!(cycle_tag(&[], None, 1), None);
    }

    #[test]
    fn view_rotation_wraps() {
        let mut state = AppState {
            active_view: ViewKind::Cards,
            ..AppState::default()
        };
        let events = state.dispatch(AppCommand::NextView);
        assert_eq!(state.active_view, ViewKind::Images);
        assert_eq!(events, vec![AppEvent::ViewChanged(ViewKind::Images)]);
    }

    #[test]
    fn search_mode_transitions() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::EnterSearch);
        assert_eq!(state.mode, AppMode::Search);
        state.dispatch(AppCommand::ExitSearch);
        assert_eq!(state.mode, AppMode::Browse);
    }

    #[test]
    fn tag_change_updates_status() {
        let catalogs = Catalogs {
            images: catalog(),
            ..Catalogs::default()
        };
        let mut state = AppState::default();

        let events = state.dispatch_view(
            &catalogs,
            ViewKind::Images,
            ViewCommand::SetTag(Some("red".to_owned())),
        );
        assert_eq!(
            events,
            vec![
                AppEvent::View(
                    ViewKind::Images,
                    ViewEvent::TagChanged(Some("red".to_owned()))
                ),
                AppEvent::StatusUpdated("tag #red".to_owned()),
            ]
        );
        assert_eq!(state.status_line.as_deref(), Some("tag #red"));
    }

    #[test]
    fn dispatch_view_targets_requested_view_only() {
        let catalogs = Catalogs {
            images: catalog(),
            ..Catalogs::default()
        };
        let mut state = AppState::default();
        state.dispatch_view(&catalogs, ViewKind::Images, ViewCommand::OpenAt(0));
        assert!(state.images.selection.is_open());
        assert!(!state.cards.selection.is_open());

        let events = state.dispatch_view(&catalogs, ViewKind::Cards, ViewCommand::OpenAt(0));
        assert!(events.is_empty());
    }
}
