mod config;
mod gesture;
mod input;
mod time;
mod tower;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::{JsCast, JsValue};

use config::Config;
use gesture::{Gesture, PointerTracker};
use input::{ClickState, GridMetrics, InputEvent};
use time::GameTime;
use tower::TowerGame;

fn performance_now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map_or(0.0, |p| p.now())
}

/// ratzilla's grid container.
fn grid_element() -> Option<web_sys::Element> {
    web_sys::window()?
        .document()?
        .query_selector("body > div")
        .ok()?
}

/// Pixel geometry of the grid container.
fn grid_metrics(cs: &ClickState) -> Option<GridMetrics> {
    if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
        return None;
    }
    let grid = grid_element()?;
    let rect = grid.get_bounding_client_rect();
    Some(GridMetrics {
        left: rect.left(),
        top: rect.top(),
        width: rect.width(),
        height: rect.height(),
        cols: cs.terminal_cols,
        rows: cs.terminal_rows,
    })
}

/// Gesture tracking shared by the mouse, touch and wheel listeners.
struct Pointer {
    tracker: PointerTracker,
    /// Fractional rows of scroll not yet applied.
    scroll_carry: f64,
}

/// Handles cloned into every callback.
#[derive(Clone)]
struct Shell {
    game: Rc<RefCell<TowerGame>>,
    click_state: Rc<RefCell<ClickState>>,
    pointer: Rc<RefCell<Pointer>>,
}

impl Shell {
    fn send(&self, event: InputEvent) -> bool {
        self.game.borrow_mut().handle_input(&event)
    }

    /// Pixel centre of a cell reported by ratzilla's mouse callback.
    fn cell_center(&self, col: u16, row: u16) -> Option<(f64, f64)> {
        grid_metrics(&self.click_state.borrow()).map(|m| m.cell_center(col, row))
    }

    fn press(&self, x: f64, y: f64) {
        let can_reorder = {
            let cs = self.click_state.borrow();
            grid_metrics(&cs)
                .and_then(|m| m.cell_at(x, y))
                .is_some_and(|(col, row)| {
                    cs.hit_test(col, row).is_none() && self.game.borrow().can_reorder_at(col, row)
                })
        };
        self.pointer
            .borrow_mut()
            .tracker
            .press(x, y, performance_now(), can_reorder);
    }

    fn motion(&self, x: f64, y: f64) {
        let gesture = self.pointer.borrow_mut().tracker.motion(x, y);
        if let Some(g) = gesture {
            self.dispatch(g);
        }
    }

    fn release(&self, x: f64, y: f64) {
        let gesture = self.pointer.borrow_mut().tracker.release(x, y);
        if let Some(g) = gesture {
            self.dispatch(g);
        }
    }

    fn poll(&self, now_ms: f64) {
        let gesture = self.pointer.borrow_mut().tracker.poll(now_ms);
        if let Some(g) = gesture {
            self.dispatch(g);
        }
    }

    /// Scroll by whole rows, carrying the remainder to the next sample.
    fn scroll_rows(&self, rows: f64) {
        let whole = {
            let mut p = self.pointer.borrow_mut();
            p.scroll_carry += rows;
            let whole = p.scroll_carry.trunc();
            p.scroll_carry -= whole;
            whole
        };
        if whole != 0.0 {
            self.send(InputEvent::Scroll(whole));
        }
    }

    fn wheel(&self, delta_y: f64) {
        let metrics = grid_metrics(&self.click_state.borrow());
        if let Some(m) = metrics.filter(|m| m.cell_height() > 0.0) {
            self.scroll_rows(delta_y / m.cell_height());
        }
    }

    fn dispatch(&self, gesture: Gesture) {
        let Some(metrics) = grid_metrics(&self.click_state.borrow()) else {
            return;
        };
        let event = match gesture {
            Gesture::ScrollBy(dy) => {
                if metrics.cell_height() > 0.0 {
                    // Dragging down pulls the upper floors into view.
                    self.scroll_rows(-dy / metrics.cell_height());
                }
                return;
            }
            Gesture::Tap { x, y } => {
                let Some((col, row)) = metrics.cell_at(x, y) else {
                    return;
                };
                let button = self.click_state.borrow().hit_test(col, row);
                match button {
                    Some(id) => InputEvent::Click(id),
                    None => InputEvent::Tap { col, row },
                }
            }
            Gesture::ReorderStart { x, y } => {
                let Some((col, row)) = metrics.cell_at(x, y) else {
                    return;
                };
                InputEvent::ReorderStart { col, row }
            }
            Gesture::ReorderMove { y, .. } => InputEvent::ReorderMove {
                row: metrics.row_clamped(y),
            },
            Gesture::ReorderDrop { y, .. } => InputEvent::ReorderDrop {
                row: metrics.row_clamped(y),
            },
        };
        self.send(event);
    }
}

/// Register a non-passive DOM listener that lives for the whole page.
fn listen<E>(target: &web_sys::EventTarget, name: &str, handler: impl FnMut(E) + 'static) -> Result<(), JsValue>
where
    E: FromWasmAbi + 'static,
{
    let callback = Closure::<dyn FnMut(E)>::new(handler);
    let opts = web_sys::AddEventListenerOptions::new();
    opts.set_passive(false);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        name,
        callback.as_ref().unchecked_ref(),
        &opts,
    )?;
    callback.forget();
    Ok(())
}

fn first_touch(list: web_sys::TouchList) -> Option<(f64, f64)> {
    list.get(0)
        .map(|t| (t.client_x() as f64, t.client_y() as f64))
}

/// Touch drags and the mouse wheel never reach ratzilla's mouse callback.
fn install_touch_and_wheel(shell: &Shell) -> Result<(), JsValue> {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return Ok(());
    };
    let target: &web_sys::EventTarget = document.as_ref();

    let s = shell.clone();
    listen(target, "touchstart", move |e: web_sys::TouchEvent| {
        if let Some((x, y)) = first_touch(e.touches()) {
            s.press(x, y);
        }
    })?;
    let s = shell.clone();
    listen(target, "touchmove", move |e: web_sys::TouchEvent| {
        e.prevent_default();
        if let Some((x, y)) = first_touch(e.touches()) {
            s.motion(x, y);
        }
    })?;
    let s = shell.clone();
    listen(target, "touchend", move |e: web_sys::TouchEvent| {
        // Suppresses the emulated mouse events that would tap twice.
        e.prevent_default();
        if let Some((x, y)) = first_touch(e.changed_touches()) {
            s.release(x, y);
        }
    })?;
    let s = shell.clone();
    listen(target, "touchcancel", move |_e: web_sys::TouchEvent| {
        s.pointer.borrow_mut().tracker.cancel();
    })?;
    let s = shell.clone();
    listen(target, "wheel", move |e: web_sys::WheelEvent| {
        e.prevent_default();
        s.wheel(e.delta_y());
    })?;
    Ok(())
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).map_err(io::Error::other)?;

    let config = Config::default();
    log::info!("SimLibrary starting ({} tick/s)", config.ticks_per_sec);

    let mut clock = GameTime::new(config.ticks_per_sec, config.max_frame_ms);
    let shell = Shell {
        pointer: Rc::new(RefCell::new(Pointer {
            tracker: PointerTracker::new(&config),
            scroll_carry: 0.0,
        })),
        game: Rc::new(RefCell::new(TowerGame::load(config))),
        click_state: Rc::new(RefCell::new(ClickState::new())),
    };

    let backend = DomBackend::new()?;
    let mut terminal = Terminal::new(backend)?;

    if let Err(e) = install_touch_and_wheel(&shell) {
        log::warn!("touch input unavailable: {:?}", e);
    }

    // ratzilla reports grid cells; the gesture tracker works in pixels.
    terminal.on_mouse_event({
        let shell = shell.clone();
        move |mouse_event| {
            let Some((x, y)) = shell.cell_center(mouse_event.col, mouse_event.row) else {
                return;
            };
            match mouse_event.kind {
                MouseEventKind::ButtonDown(MouseButton::Left) => shell.press(x, y),
                MouseEventKind::Moved => shell.motion(x, y),
                MouseEventKind::ButtonUp(MouseButton::Left) | MouseEventKind::Exited => {
                    shell.release(x, y)
                }
                _ => {}
            }
        }
    })?;

    terminal.on_key_event({
        let shell = shell.clone();
        move |key_event| {
            let key = match key_event.code {
                KeyCode::Char(c) => c.to_ascii_lowercase(),
                KeyCode::Esc => '\x1b',
                KeyCode::Up => 'k',
                KeyCode::Down => 'j',
                _ => return,
            };
            shell.send(InputEvent::Key(key));
        }
    })?;

    // Key events go to the grid, so it needs focus to receive them.
    if let Some(grid) = grid_element().and_then(|e| e.dyn_into::<web_sys::HtmlElement>().ok()) {
        let _ = grid.focus();
    }

    terminal.draw_web(move |f| {
        let now = performance_now();
        let ticks = clock.update(now);
        shell.game.borrow_mut().tick(ticks);
        shell.poll(now);

        let area = f.area();
        let mut cs = shell.click_state.borrow_mut();
        cs.terminal_cols = area.width;
        cs.terminal_rows = area.height;
        cs.clear_targets();
        shell
            .game
            .borrow_mut()
            .render(f, area, &mut cs, now, clock.alpha());
    });

    Ok(())
}
