//! SimLibrary rendering.
//!
//! The tower geometry is computed once per frame into `game.layout`; the
//! floors, shaft and lobby are drawn from those rects and the controller
//! hit-tests taps against the same value.

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratzilla::ratatui::Frame;
use tachyonfx::{fx, Duration, Effect, EffectRenderer, Interpolation};

use crate::input::{is_narrow_layout, ClickState};
use crate::widgets::{ButtonBar, ClickableList};

use super::achievements::ALL_ACHIEVEMENTS;
use super::actions::*;
use super::catalog::{floor_info, ALL_FLOOR_TYPES};
use super::layout::{content_rows, FloorLayout, TowerLayout, FLOOR_ROWS};
use super::logic::{format_number, restock_secs, rush_build_cost};
use super::missions::{self, Banner};
use super::state::{
    Car, ElevatorState, Floor, FloorStatus, TowerState, ALL_INCIDENTS, RUSH_RESTOCK_BUX,
    STAFF_SLOTS, TRASH_MAX,
};
use super::{escort_choices, hire_choices, Confirm, Modal, ToastKind, TowerGame};

const SIDE_PANEL_WIDTH: u16 = 30;
const MODAL_WIDTH: u16 = 52;
const FADE_MS: u32 = 400;
const INCIDENT_KEYS: [char; 3] = ['F', 'G', 'H'];
const MOVE_KEYS: [char; STAFF_SLOTS] = ['Z', 'W', 'O'];

/// Fade-in of the newest toast.
#[derive(Default)]
pub struct ToastFx {
    effect: Option<Effect>,
    serial: u64,
    last_ms: Option<f64>,
}

pub fn render(
    game: &mut TowerGame,
    f: &mut Frame,
    area: Rect,
    cs: &mut ClickState,
    now_ms: f64,
    alpha: f64,
) {
    let narrow = is_narrow_layout(area.width);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Buttons
            Constraint::Length(1), // HUD
            Constraint::Length(1), // Banner
            Constraint::Min(4),    // Tower (+ side panel)
            Constraint::Length(1), // Toast
        ])
        .split(area);

    render_top_bar(f, rows[0], cs, narrow);
    render_hud(&game.state, f, rows[1]);
    render_banner(game, f, rows[2], cs);

    if narrow {
        render_tower(game, f, rows[3], alpha);
    } else {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(30), Constraint::Length(SIDE_PANEL_WIDTH)])
            .split(rows[3]);
        render_tower(game, f, cols[0], alpha);
        render_side_panel(game, f, cols[1], cs);
    }

    render_toast(game, f, rows[4], now_ms);

    if game.modal != Modal::None {
        render_modal(game, f, rows[3], cs);
    }
}

// ── Top ────────────────────────────────────────────────────────

fn render_top_bar(f: &mut Frame, area: Rect, cs: &mut ClickState, narrow: bool) {
    let key = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let labels: [(&str, &str, u16); 5] = [
        ("[B]uild", "[B]", OPEN_BUILD),
        ("[S]tats", "[S]", OPEN_STATS),
        ("[A]chievements", "[A]", OPEN_ACHIEVEMENTS),
        ("[E]xport", "[E]", EXPORT_SAVE),
        ("[I]mport", "[I]", IMPORT_SAVE),
    ];
    let mut bar = ButtonBar::new(2);
    for (wide, short, id) in labels {
        bar = bar.button(if narrow { short } else { wide }, key, id);
    }
    bar.render(f, area, cs);
}

fn render_hud(state: &TowerState, f: &mut Frame, area: Rect) {
    let mut spans = vec![
        Span::styled(
            format!("💰 {}", format_number(state.coins)),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("💎 {}", state.bux),
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("🏢 {}", state.floors.len()),
            Style::default().fg(Color::White),
        ),
        Span::raw("  "),
        Span::styled(
            format!("👥 {}", state.staff.len()),
            Style::default().fg(Color::White),
        ),
        Span::raw("  "),
        Span::styled(
            format!("⏳ {}", state.waiting_count()),
            Style::default().fg(Color::Gray),
        ),
    ];
    let mult = state.missions.earnings_mult();
    if mult > 1.0 {
        spans.push(Span::styled(
            format!("  x{:.0} coins", mult),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_banner(game: &TowerGame, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    if let Some(staff) = game.moving_staff {
        let name = game
            .state
            .staff_member(staff)
            .map(|s| s.name.clone())
            .unwrap_or_default();
        let line = Line::from(Span::styled(
            format!("🚚 Moving {}: tap a free slot (Esc cancels)", name),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
        f.render_widget(Paragraph::new(line), area);
        return;
    }

    let Some(banner) = missions::banner(&game.state) else {
        return;
    };
    let (text, style) = match banner {
        Banner::MiniQuest {
            floor,
            delivered,
            target,
            secs_left,
        } => {
            let name = game
                .state
                .floor(floor)
                .map(|f| f.name.as_str())
                .unwrap_or("?");
            (
                format!("🎯 Send readers to {}: {}/{} ({}s)", name, delivered, target, secs_left),
                Style::default().fg(Color::Cyan),
            )
        }
        Banner::FindMission { item, secs_left } => (
            format!("🔍 Someone lost their {}! Tap floors to search ({}s)", item, secs_left),
            Style::default().fg(Color::LightBlue),
        ),
        Banner::Event {
            name,
            description,
            secs_left,
        } => (
            format!("🎉 {}: {} ({}s)", name, description, secs_left),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Banner::Mission {
            name,
            progress,
            target,
            complete,
        } => {
            if complete {
                (
                    format!("✅ {} complete! Tap to claim", name),
                    Style::default().fg(Color::Black).bg(Color::Green),
                )
            } else {
                (
                    format!("📋 {}: {}/{}", name, progress, target),
                    Style::default().fg(Color::Gray),
                )
            }
        }
    };
    f.render_widget(Paragraph::new(Line::from(Span::styled(text, style))), area);
    cs.add_row_target(area, area.y, BANNER);
}

// ── Tower ──────────────────────────────────────────────────────

fn render_tower(game: &mut TowerGame, f: &mut Frame, area: Rect, alpha: f64) {
    let n = game.state.floors.len();
    let scroll_hint = if game.scroll.max == 0 {
        ""
    } else if game.scroll.offset == 0 {
        " ▼"
    } else if game.scroll.offset >= game.scroll.max {
        " ▲"
    } else {
        " ▲▼"
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" Tower{} ", scroll_hint));
    let inner = block.inner(area);
    f.render_widget(block, area);

    game.scroll.sync(content_rows(n), inner.height);
    let now = game.state.now as f64 + alpha;
    game.layout = TowerLayout::compute(&game.state, inner, &game.scroll, game.drag, now);

    let state = &game.state;
    let layout = &game.layout;
    render_shaft(state, f, layout);
    for fl in &layout.floors {
        if let Ok(floor) = state.floor(fl.id) {
            render_floor(state, floor, fl, layout.viewport, f, game.moving_staff.is_some());
        }
    }
    render_lobby(state, f, layout);
}

/// One screen row of a floor band, accounting for clipping at the top.
fn floor_row(fl: &FloorLayout, viewport: Rect, k: u16) -> Option<Rect> {
    let hidden_top = if fl.rect.height < FLOOR_ROWS && fl.rect.y == viewport.y {
        FLOOR_ROWS - fl.rect.height
    } else {
        0
    };
    let visible = k.checked_sub(hidden_top)?;
    (visible < fl.rect.height).then(|| Rect::new(fl.rect.x, fl.rect.y + visible, fl.rect.width, 1))
}

fn render_floor(
    state: &TowerState,
    floor: &Floor,
    fl: &FloorLayout,
    viewport: Rect,
    f: &mut Frame,
    moving: bool,
) {
    let info = floor_info(floor.type_id);
    let title_style = if fl.held {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    };

    let mut title = vec![Span::styled(format!("{} {}", info.emoji, floor.name), title_style)];
    if floor.upgrade_level > 0 {
        title.push(Span::styled(
            format!(" ★{}", floor.upgrade_level),
            Style::default().fg(Color::Yellow),
        ));
    }
    let browsing = state
        .readers
        .iter()
        .filter(|r| r.floor_id == floor.id && matches!(r.elevator, ElevatorState::Arrived { .. }))
        .count();
    if browsing > 0 {
        title.push(Span::styled(
            format!("  📖×{}", browsing),
            Style::default().fg(Color::Cyan),
        ));
    }
    if floor.trash >= TRASH_MAX / 2 {
        title.push(Span::styled(" 🗑", Style::default().fg(Color::DarkGray)));
    }
    if !floor.incidents.is_empty() {
        title.push(Span::styled(
            format!(" ⚠{}", floor.incidents.len()),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }
    if state
        .missions
        .quest
        .as_ref()
        .is_some_and(|q| q.floor == floor.id)
    {
        title.push(Span::styled(" 🎯", Style::default().fg(Color::Cyan)));
    }
    f.render_widget(Paragraph::new(Line::from(title)), fl.title);

    if let FloorStatus::Building { started_at, ends_at } = floor.status {
        let total = ends_at.saturating_sub(started_at).max(1);
        let done = state.now.saturating_sub(started_at).min(total);
        if let Some(row) = floor_row(fl, viewport, 1) {
            let bar_width = row.width.saturating_sub(12) as u64;
            let filled = (bar_width * done / total) as usize;
            let line = Line::from(vec![
                Span::styled("🚧 ", Style::default().fg(Color::Yellow)),
                Span::styled("█".repeat(filled), Style::default().fg(Color::Yellow)),
                Span::styled(
                    "░".repeat(bar_width as usize - filled),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(format!(" {}s", ends_at.saturating_sub(state.now))),
            ]);
            f.render_widget(Paragraph::new(line), row);
        }
        return;
    }

    for (i, rect) in fl.shelves.iter().enumerate() {
        let c = &floor.book_stock[i];
        let (text, color) = match c.restock {
            Some(r) => (
                format!("⟳ {}s", r.ends_at.saturating_sub(state.now)),
                Color::Blue,
            ),
            None => {
                let color = if c.current == 0 {
                    Color::Red
                } else if c.current * 4 <= c.max {
                    Color::Yellow
                } else {
                    Color::Green
                };
                (format!("📚{}/{}", c.current, c.max), color)
            }
        };
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(text, Style::default().fg(color)))),
            *rect,
        );
    }

    for (slot, rect) in fl.slots.iter().enumerate() {
        let line = match floor.staff[slot].and_then(|id| state.staff_member(id).ok()) {
            Some(s) => {
                let color = s.color.parse::<Color>().unwrap_or(Color::White);
                let dream = if s.dream_genre == floor.type_id { "♥" } else { "" };
                Line::from(Span::styled(
                    format!("{}{}{}", s.emoji, s.name, dream),
                    Style::default().fg(color),
                ))
            }
            None if moving || state.applicant.is_some() => Line::from(Span::styled(
                "[+] free",
                Style::default().fg(Color::Green),
            )),
            None => Line::from(Span::styled("· empty", Style::default().fg(Color::DarkGray))),
        };
        f.render_widget(Paragraph::new(line), *rect);
    }
}

fn render_shaft(state: &TowerState, f: &mut Frame, layout: &TowerLayout) {
    let shaft = layout.shaft;
    if shaft.height == 0 {
        return;
    }
    let walls: Vec<Line> = (0..shaft.height)
        .map(|_| Line::from(Span::styled("│  │", Style::default().fg(Color::DarkGray))))
        .collect();
    f.render_widget(Paragraph::new(walls), shaft);

    let Some(car) = layout.car else {
        return;
    };
    let rider = match state.car {
        Car::Up { reader, .. } => state
            .readers
            .iter()
            .find(|r| r.id == reader)
            .map(|r| r.kind.emoji())
            .unwrap_or("  "),
        _ => "  ",
    };
    let style = Style::default().fg(Color::Yellow);
    let lines = vec![
        Line::from(Span::styled("┌──┐", style)),
        Line::from(vec![
            Span::styled("│", style),
            Span::raw(rider),
            Span::styled("│", style),
        ]),
        Line::from(Span::styled("└──┘", style)),
    ];
    let hidden_top = if car.height < FLOOR_ROWS && car.y == layout.viewport.y {
        FLOOR_ROWS - car.height
    } else {
        0
    };
    f.render_widget(Paragraph::new(lines).scroll((hidden_top, 0)), car);
}

fn render_lobby(state: &TowerState, f: &mut Frame, layout: &TowerLayout) {
    let Some(lobby) = &layout.lobby else {
        return;
    };
    let waiting = state.waiting_count();
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("🏛 Lobby", Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {} waiting", waiting), Style::default().fg(Color::Gray)),
        ])),
        lobby.title,
    );

    let applicant = match &state.applicant {
        Some(a) => Span::styled(
            format!("{}{} wants a job", a.emoji, a.name),
            Style::default().fg(Color::Green),
        ),
        None => Span::styled("no applicants", Style::default().fg(Color::DarkGray)),
    };
    f.render_widget(Paragraph::new(Line::from(applicant)), lobby.applicant);

    let vip = match &state.vip {
        Some(v) => Span::styled(
            format!("⭐ {}", v.kind.name()),
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ),
        None => Span::styled("no VIP", Style::default().fg(Color::DarkGray)),
    };
    f.render_widget(Paragraph::new(Line::from(vip)), lobby.vip);

    let queue: String = state
        .readers
        .iter()
        .filter(|r| r.is_waiting())
        .take((lobby.queue.width / 2) as usize)
        .map(|r| r.kind.emoji())
        .collect();
    f.render_widget(Paragraph::new(queue), lobby.queue);
}

// ── Side panel ─────────────────────────────────────────────────

fn render_side_panel(game: &TowerGame, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let state = &game.state;
    let label = Style::default().fg(Color::Gray);
    let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let key = Style::default().fg(Color::Cyan);

    let mut cl = ClickableList::new();
    cl.push(Line::from(vec![
        Span::styled("Open floors ", label),
        Span::styled(format!("{}/{}", state.ready_floor_count(), state.floors.len()), value),
    ]));
    cl.push(Line::from(vec![
        Span::styled("Checkouts   ", label),
        Span::styled(format_number(state.stats.total_checkouts), value),
    ]));
    cl.push(Line::from(vec![
        Span::styled("Riders      ", label),
        Span::styled(
            format!(
                "{}",
                state
                    .readers
                    .iter()
                    .filter(|r| matches!(r.elevator, ElevatorState::Riding { .. }))
                    .count()
            ),
            value,
        ),
    ]));
    cl.push(Line::from(""));
    cl.push_clickable(Line::from(Span::styled("[K] ▲ Scroll up", key)), SCROLL_UP);
    cl.push_clickable(Line::from(Span::styled("[J] ▼ Scroll down", key)), SCROLL_DOWN);
    cl.push_clickable(Line::from(Span::styled("[L] Lobby applicant", key)), OPEN_APPLICANT);
    cl.push_clickable(Line::from(Span::styled("[V] Lobby VIP", key)), OPEN_VIP);
    cl.push(Line::from(""));
    cl.push(Line::from(Span::styled("Recent", label)));
    for toast in game.toasts.iter().rev() {
        cl.push(Line::from(Span::styled(
            toast.text.clone(),
            Style::default().fg(toast_color(toast.kind)),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Library ");
    let inner = block.inner(area);
    cl.register_targets(inner, cs, 0, None);
    f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
}

// ── Toast ──────────────────────────────────────────────────────

fn toast_color(kind: ToastKind) -> Color {
    match kind {
        ToastKind::Info => Color::White,
        ToastKind::Success => Color::Green,
        ToastKind::Error => Color::Red,
    }
}

fn render_toast(game: &mut TowerGame, f: &mut Frame, area: Rect, now_ms: f64) {
    let Some(toast) = game.toasts.back() else {
        game.fx.effect = None;
        return;
    };
    let style = Style::default()
        .fg(toast_color(toast.kind))
        .add_modifier(Modifier::BOLD);
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(toast.text.clone(), style)))
            .alignment(Alignment::Center),
        area,
    );

    let fx = &mut game.fx;
    if fx.serial != game.toast_serial {
        fx.serial = game.toast_serial;
        fx.effect = Some(fx::fade_from_fg(Color::Black, (FADE_MS, Interpolation::QuadOut)));
    }
    let elapsed = fx.last_ms.map_or(0.0, |last| (now_ms - last).clamp(0.0, 1000.0));
    fx.last_ms = Some(now_ms);
    if let Some(effect) = &mut fx.effect {
        f.render_effect(effect, area, Duration::from_millis(elapsed as u32));
        if effect.done() {
            fx.effect = None;
        }
    }
}

// ── Modals ─────────────────────────────────────────────────────

fn render_modal(game: &mut TowerGame, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let (title, cl) = match game.modal {
        Modal::None => return,
        Modal::Build => (" Build ".to_string(), build_list(&game.state)),
        Modal::FloorDetail(id) => match game.state.floor(id) {
            Ok(floor) => (format!(" {} ", floor.name), floor_detail(&game.state, floor)),
            Err(_) => return,
        },
        Modal::Applicant => (" Applicant ".to_string(), applicant_list(&game.state)),
        Modal::Vip => (" VIP ".to_string(), vip_list(&game.state)),
        Modal::Stats => (" Stats ".to_string(), stats_list(&game.state)),
        Modal::Achievements => (" Achievements ".to_string(), achievement_list(&game.state)),
        Modal::Confirm(c) => (" Confirm ".to_string(), confirm_list(&game.state, c)),
    };

    let width = MODAL_WIDTH.min(area.width);
    let inner_width = width.saturating_sub(2);
    let paragraph_rows = {
        let probe = Paragraph::new(cl.lines().to_vec()).wrap(Wrap { trim: false });
        probe.line_count(inner_width) as u16
    };
    let height = (paragraph_rows + 2).min(area.height);
    let rect = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title);
    let inner = block.inner(rect);
    game.detail_scroll.sync(paragraph_rows, inner.height);
    let offset = game.detail_scroll.offset;

    f.render_widget(Clear, rect);
    cl.register_targets(inner, cs, offset, Some(inner.width));
    f.render_widget(
        Paragraph::new(cl.into_lines())
            .wrap(Wrap { trim: false })
            .scroll((offset, 0))
            .block(block),
        rect,
    );
}

fn button(text: String, enabled: bool) -> Line<'static> {
    let style = if enabled {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Line::from(Span::styled(text, style))
}

fn close_button(cl: &mut ClickableList) {
    cl.push(Line::from(""));
    cl.push_clickable(button("[Esc] Close".to_string(), true), CLOSE_MODAL);
}

fn build_list(state: &TowerState) -> ClickableList<'static> {
    let mut cl = ClickableList::new();
    cl.push(Line::from(Span::styled(
        "Each floor costs more than the last.",
        Style::default().fg(Color::Gray),
    )));
    for (i, kind) in ALL_FLOOR_TYPES.iter().enumerate() {
        let info = floor_info(*kind);
        let cost = state.build_cost(*kind);
        cl.push_clickable(
            button(
                format!(
                    "[{}] {} {}  {}c  {}s",
                    i + 1,
                    info.emoji,
                    info.name,
                    format_number(cost),
                    info.build_secs
                ),
                state.coins >= cost,
            ),
            BUILD_BASE + i as u16,
        );
    }
    close_button(&mut cl);
    cl
}

fn floor_detail(state: &TowerState, floor: &Floor) -> ClickableList<'static> {
    let info = floor_info(floor.type_id);
    let gray = Style::default().fg(Color::Gray);
    let mut cl = ClickableList::new();
    cl.push(Line::from(vec![
        Span::styled(format!("{} {}", info.emoji, info.name), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(format!("  level {}", floor.upgrade_level), gray),
    ]));

    if let FloorStatus::Building { .. } = floor.status {
        let remaining = floor.build_remaining(state.now);
        cl.push(Line::from(Span::styled(
            format!("🚧 Under construction, {}s left", remaining),
            Style::default().fg(Color::Yellow),
        )));
        let cost = rush_build_cost(remaining);
        cl.push_clickable(
            button(format!("[R] Finish now ({} bux)", cost), state.bux >= cost),
            RUSH_BUILD,
        );
    } else {
        cl.push(Line::from(Span::styled(
            format!("Earnings x{:.2}", floor.earning_mult()),
            gray,
        )));
        cl.push(Line::from(""));
        for (tier, c) in floor.book_stock.iter().enumerate() {
            cl.push(Line::from(vec![
                Span::styled(info.categories[tier].to_string(), Style::default().fg(Color::White)),
                Span::styled(format!("  {}/{}", c.current, c.max), gray),
            ]));
            match c.restock {
                Some(r) => {
                    cl.push(Line::from(Span::styled(
                        format!("  ⟳ restocking, {}s left", r.ends_at.saturating_sub(state.now)),
                        Style::default().fg(Color::Blue),
                    )));
                    cl.push_clickable(
                        button(
                            format!("  [{}] Finish now ({} bux)", tier + 4, RUSH_RESTOCK_BUX),
                            state.bux >= RUSH_RESTOCK_BUX,
                        ),
                        RUSH_RESTOCK_BASE + tier as u16,
                    );
                }
                None => {
                    let cost = floor.restock_cost(tier);
                    let secs = restock_secs(state, floor.id, tier)
                        .map(|s| format!("{}s", s))
                        .unwrap_or_default();
                    let can = c.current < c.max && floor.staff_count() > 0 && state.coins >= cost;
                    cl.push_clickable(
                        button(format!("  [{}] Restock ({}c, {})", tier + 1, cost, secs), can),
                        RESTOCK_BASE + tier as u16,
                    );
                }
            }
        }

        cl.push(Line::from(""));
        cl.push(Line::from(Span::styled("Staff", Style::default().add_modifier(Modifier::BOLD))));
        for (slot, assigned) in floor.staff.iter().enumerate() {
            match assigned.and_then(|id| state.staff_member(id).ok()) {
                Some(s) => {
                    let dream = if s.dream_genre == floor.type_id {
                        " ♥ dream job"
                    } else {
                        ""
                    };
                    cl.push(Line::from(Span::raw(format!("  {}{}{}", s.emoji, s.name, dream))));
                    cl.push_clickable(
                        button(format!("    [{}] Fire", slot + 7), true),
                        FIRE_BASE + slot as u16,
                    );
                    cl.push_clickable(
                        button(format!("    [{}] Move", MOVE_KEYS[slot]), true),
                        MOVE_BASE + slot as u16,
                    );
                }
                None => cl.push(Line::from(Span::styled("  · empty slot", gray))),
            }
        }

        cl.push(Line::from(""));
        cl.push(Line::from(Span::styled(
            format!("Trash {}/{}", floor.trash, TRASH_MAX),
            gray,
        )));
        if floor.trash > 0 {
            cl.push_clickable(button("  [C] Clean (free)".to_string(), true), CLEAN);
        }
        for (i, incident) in ALL_INCIDENTS.iter().enumerate() {
            if floor.incidents.contains(incident) {
                cl.push_clickable(
                    button(
                        format!("  [{}] Fix {} ({}c)", INCIDENT_KEYS[i], incident.name(), incident.fix_cost()),
                        state.coins >= incident.fix_cost(),
                    ),
                    FIX_BASE + i as u16,
                );
            }
        }
    }

    cl.push(Line::from(""));
    match floor.upgrade_cost() {
        Some(cost) if floor.is_ready() => cl.push_clickable(
            button(
                format!("[U] Upgrade to level {} ({}c)", floor.upgrade_level + 1, format_number(cost)),
                state.coins >= cost,
            ),
            UPGRADE,
        ),
        Some(_) => {}
        None => cl.push(Line::from(Span::styled("Fully upgraded", gray))),
    }
    cl.push_clickable(
        Line::from(Span::styled("[X] Demolish", Style::default().fg(Color::Red))),
        DELETE_FLOOR,
    );
    close_button(&mut cl);
    cl
}

fn applicant_list(state: &TowerState) -> ClickableList<'static> {
    let mut cl = ClickableList::new();
    let Some(a) = &state.applicant else {
        cl.push(Line::from("Nobody is waiting."));
        close_button(&mut cl);
        return cl;
    };
    cl.push(Line::from(Span::styled(
        format!("{}{} wants a job", a.emoji, a.name),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    cl.push(Line::from(Span::styled(
        format!("Dream job: {}", floor_info(a.dream_genre).name),
        Style::default().fg(Color::Magenta),
    )));
    cl.push(Line::from(""));
    let choices = hire_choices(state);
    if choices.is_empty() {
        cl.push(Line::from(Span::styled(
            "No open floor has a free slot.",
            Style::default().fg(Color::Gray),
        )));
    }
    for (i, (floor, slot)) in choices.iter().enumerate().take(LIST_RANGE as usize) {
        let Ok(fl) = state.floor(*floor) else {
            continue;
        };
        let dream = if fl.type_id == a.dream_genre { " ♥" } else { "" };
        let key = if i < 9 { format!("[{}] ", i + 1) } else { String::new() };
        cl.push_clickable(
            button(format!("{}{} slot {}{}", key, fl.name, slot + 1, dream), true),
            HIRE_BASE + i as u16,
        );
    }
    cl.push(Line::from(""));
    cl.push_clickable(
        Line::from(Span::styled("[D] Send away", Style::default().fg(Color::Red))),
        DISMISS_APPLICANT,
    );
    close_button(&mut cl);
    cl
}

fn vip_list(state: &TowerState) -> ClickableList<'static> {
    let mut cl = ClickableList::new();
    let Some(vip) = &state.vip else {
        cl.push(Line::from("No VIP is waiting."));
        close_button(&mut cl);
        return cl;
    };
    cl.push(Line::from(Span::styled(
        format!("⭐ {}", vip.kind.name()),
        Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
    )));
    cl.push(Line::from(Span::styled(
        format!("Escort them to any open floor: {}", vip.kind.description()),
        Style::default().fg(Color::Gray),
    )));
    cl.push(Line::from(""));
    for (i, floor) in escort_choices(state).iter().enumerate().take(LIST_RANGE as usize) {
        let Ok(fl) = state.floor(*floor) else {
            continue;
        };
        let key = if i < 9 { format!("[{}] ", i + 1) } else { String::new() };
        cl.push_clickable(
            button(format!("{}{} {}", key, floor_info(fl.type_id).emoji, fl.name), true),
            ESCORT_BASE + i as u16,
        );
    }
    cl.push(Line::from(""));
    cl.push_clickable(
        Line::from(Span::styled("[D] Send away", Style::default().fg(Color::Red))),
        DISMISS_VIP,
    );
    close_button(&mut cl);
    cl
}

fn stats_list(state: &TowerState) -> ClickableList<'static> {
    let s = &state.stats;
    let rows = [
        ("Books checked out", format_number(s.total_checkouts)),
        ("Coins earned", format_number(s.coins_earned)),
        ("Floors built", s.floors_built.to_string()),
        ("Staff hired", s.staff_hired.to_string()),
        ("VIPs escorted", s.vips_escorted.to_string()),
        ("Readers lost", format_number(s.readers_lost)),
        (
            "Time played",
            format!("{}:{:02}:{:02}", state.now / 3600, state.now / 60 % 60, state.now % 60),
        ),
    ];
    let mut cl = ClickableList::new();
    for (label, value) in rows {
        cl.push(Line::from(vec![
            Span::styled(format!("{:<18}", label), Style::default().fg(Color::Gray)),
            Span::styled(value, Style::default().add_modifier(Modifier::BOLD)),
        ]));
    }
    close_button(&mut cl);
    cl
}

fn achievement_list(state: &TowerState) -> ClickableList<'static> {
    let mut cl = ClickableList::new();
    cl.push(Line::from(Span::styled(
        format!("{}/{} unlocked", state.achievements.len(), ALL_ACHIEVEMENTS.len()),
        Style::default().fg(Color::Gray),
    )));
    for a in ALL_ACHIEVEMENTS {
        let unlocked = state.achievements.contains(&a);
        let (mark, style) = if unlocked {
            ("✔", Style::default().fg(Color::Green))
        } else {
            ("·", Style::default().fg(Color::DarkGray))
        };
        cl.push(Line::from(vec![
            Span::styled(format!("{} {}", mark, a.name()), style.add_modifier(Modifier::BOLD)),
            Span::styled(format!(": {}", a.description()), style),
        ]));
    }
    close_button(&mut cl);
    cl
}

fn confirm_prompt(state: &TowerState, confirm: Confirm) -> String {
    match confirm {
        Confirm::DeleteFloor(id) => {
            let name = state.floor(id).map(|f| f.name.as_str()).unwrap_or("this floor");
            format!("Demolish {}? Its books are lost.", name)
        }
        Confirm::FireStaff(id) => {
            let name = state.staff_member(id).map(|s| s.name.as_str()).unwrap_or("them");
            format!("Fire {}?", name)
        }
        Confirm::DismissVip => "Send the VIP away?".to_string(),
    }
}

fn confirm_list(state: &TowerState, confirm: Confirm) -> ClickableList<'static> {
    let mut cl = ClickableList::new();
    cl.push(Line::from(Span::styled(
        confirm_prompt(state, confirm),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    cl.push(Line::from(""));
    cl.push_clickable(
        Line::from(Span::styled("[Y] Yes", Style::default().fg(Color::Red))),
        CONFIRM_YES,
    );
    cl.push_clickable(button("[N] No".to_string(), true), CONFIRM_NO);
    cl
}
