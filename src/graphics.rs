use macroquad::prelude::*;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use rover_drive::{Direction, Speed};

use crate::blackboard::{
    raise_fault, set_phase, set_port, set_speed, snapshot, touch_cmd, AppState, Blackboard,
    LinkPhase,
};
use crate::bus::{LinkBus, LinkEvent};
use crate::connection::{self, BoardLink, LinkSlot};

// Function to configure the macroquad window
pub fn window_conf() -> Conf {
    Conf {
        window_title: "HW-095 Motor Controller".to_string(),
        window_width: 700,
        window_height: 500,
        high_dpi: true,
        ..Default::default()
    }
}

const WINDOW_W: f32 = 700.0;
const BTN_W: f32 = 96.0;
const BTN_H: f32 = 40.0;
const GRID_GAP: f32 = 12.0;
const GRID_Y: f32 = 116.0;
const SLIDER_W: f32 = 320.0;
const SLIDER_Y: f32 = 296.0;
const EXIT_Y: f32 = 348.0;
// Matches the notches of the speed scale users drag.
const SPEED_STEP: f32 = 0.1;

const KEY_BINDINGS: [(KeyCode, Direction); 5] = [
    (KeyCode::W, Direction::Forward),
    (KeyCode::Z, Direction::Backward),
    (KeyCode::Q, Direction::RotateCcw),
    (KeyCode::E, Direction::RotateCw),
    (KeyCode::S, Direction::Stop),
];

/// Frame loop for the control window.
///
/// The pad works like a dead-man's handle: motion runs while a direction
/// button is held and stops on release. Keyboard commands latch instead,
/// and run until the stop key. The loop owns the board link once the
/// worker hands it over; everything it does to pins happens through
/// [`dispatch`].
pub async fn run(bb: Blackboard, bus: LinkBus, slot: LinkSlot, device: String) {
    let mut events = bus.subscribe();
    let mut link: Option<BoardLink> = None;
    let mut pad_held = false;

    info!("Control window up");
    prevent_quit();

    loop {
        if is_quit_requested() {
            if let Some(board) = link.take() {
                connection::teardown(board);
            }
            info!("Window closed, shutting down");
            break;
        }

        match events.try_recv() {
            Ok(event) => match &*event {
                LinkEvent::Connected { port } => {
                    link = slot.lock().take();
                    if link.is_some() {
                        set_phase(&bb, LinkPhase::Connected);
                        set_port(&bb, Some(port.clone()));
                        info!(port = %port, "board ready");
                    } else {
                        raise_fault(&bb, "link handoff missed");
                        set_phase(&bb, LinkPhase::Disconnected);
                    }
                }
                LinkEvent::ConnectFailed { reason } => {
                    warn!(reason = %reason, "connection failed");
                    raise_fault(&bb, reason);
                    set_phase(&bb, LinkPhase::Disconnected);
                }
            },
            Err(broadcast::error::TryRecvError::Empty) => {
                // No news from the link worker this frame.
            }
            Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                warn!(missed, "link event receiver lagged");
                while let Err(broadcast::error::TryRecvError::Lagged(_)) = events.try_recv() {}
            }
            Err(broadcast::error::TryRecvError::Closed) => {
                // Cannot happen while this loop holds a bus clone.
            }
        }

        // A ramp worker that hit a write error latches the fault flag; the
        // session is torn down here, on the owning thread.
        if let Some(dead) = link.take_if(|l| l.controller.faulted()) {
            error!(port = %dead.port, "enable write failed mid-ramp, dropping link");
            raise_fault(&bb, "pwm write failed mid-ramp");
            set_phase(&bb, LinkPhase::Disconnected);
            set_port(&bb, None);
            touch_cmd(&bb, None);
            connection::teardown(dead);
        }

        // Releasing the pad anywhere in the window stops the motors.
        if pad_held && is_mouse_button_released(MouseButton::Left) {
            pad_held = false;
            dispatch(&mut link, &bb, Direction::Stop);
        }

        let state = snapshot(&bb);
        let connected = state.phase == LinkPhase::Connected && link.is_some();

        if connected {
            if let Some(direction) = pressed_direction() {
                dispatch(&mut link, &bb, direction);
            }
            if is_key_pressed(KeyCode::A) || is_key_pressed(KeyCode::D) {
                debug!("left/right keys have no bridge mapping, command not sent");
            }
        }

        clear_background(LIGHTGRAY);

        draw_centered(&status_line(&state, &device), 52.0, 24.0, status_color(&state));
        let detail = format!(
            "Speed: {}   Command: {}",
            state.target_speed,
            command_label(state.commanded)
        );
        draw_centered(&detail, 84.0, 18.0, DARKGRAY);

        // Direction pad. Corner buttons rotate in place; A and D are
        // reserved for differential turns the bridge has no mapping for.
        let col = |i: usize| {
            (WINDOW_W - 3.0 * BTN_W - 2.0 * GRID_GAP) / 2.0 + i as f32 * (BTN_W + GRID_GAP)
        };
        let row = |i: usize| GRID_Y + i as f32 * (BTN_H + GRID_GAP);
        let pad = [
            (col(0), row(0), "Q ccw", Some(Direction::RotateCcw)),
            (col(1), row(0), "W fwd", Some(Direction::Forward)),
            (col(2), row(0), "E cw", Some(Direction::RotateCw)),
            (col(0), row(1), "A", None),
            (col(2), row(1), "D", None),
            (col(1), row(2), "Z rev", Some(Direction::Backward)),
        ];
        for (x, y, label, direction) in pad {
            if button(Rect::new(x, y, BTN_W, BTN_H), label, connected) {
                pad_held = true;
                match direction {
                    Some(direction) => dispatch(&mut link, &bb, direction),
                    None => debug!(label, "turn buttons have no bridge mapping"),
                }
            }
        }
        if button(
            Rect::new(col(1), row(1), BTN_W, BTN_H),
            "STOP",
            link.is_some(),
        ) {
            pad_held = false;
            dispatch(&mut link, &bb, Direction::Stop);
        }

        // Speed scale. Takes effect on the next motion command, not the
        // one in flight.
        let track = Rect::new((WINDOW_W - SLIDER_W) / 2.0, SLIDER_Y, SLIDER_W, 16.0);
        if let Some(next) = slider(track, state.target_speed.value()) {
            debug!(speed = next, "speed set");
            set_speed(&bb, Speed::saturating(next));
        }
        draw_text(
            &format!("{}", state.target_speed),
            track.x + track.w + 14.0,
            SLIDER_Y + 13.0,
            18.0,
            BLACK,
        );

        if button(
            Rect::new((WINDOW_W - BTN_W) / 2.0, EXIT_Y, BTN_W, 36.0),
            "Exit",
            true,
        ) {
            if let Some(board) = link.take() {
                connection::teardown(board);
            }
            info!("Exit pressed, shutting down");
            break;
        }

        draw_centered(
            "Keys: W forward, Z backward, Q rotate CCW, E rotate CW, S stop",
            472.0,
            16.0,
            DARKGRAY,
        );

        next_frame().await
    }
}

/// Send one drive command to the board, tearing the link down on failure.
fn dispatch(link: &mut Option<BoardLink>, bb: &Blackboard, direction: Direction) {
    let Some(board) = link.as_mut() else { return };
    let target = snapshot(bb).target_speed;
    match board.controller.start_motion(direction, target) {
        Ok(true) => {
            info!(%direction, %target, "command accepted");
            touch_cmd(bb, (direction != Direction::Stop).then_some(direction));
        }
        Ok(false) => {
            debug!(%direction, "command ignored while ramp active");
        }
        Err(e) => {
            error!(%direction, error = %e, "pin write failed, dropping link");
            raise_fault(bb, &e.to_string());
            set_phase(bb, LinkPhase::Disconnected);
            set_port(bb, None);
            touch_cmd(bb, None);
            if let Some(dead) = link.take() {
                connection::teardown(dead);
            }
        }
    }
}

fn pressed_direction() -> Option<Direction> {
    KEY_BINDINGS
        .iter()
        .find(|(key, _)| is_key_pressed(*key))
        .map(|&(_, direction)| direction)
}

fn status_line(state: &AppState, device: &str) -> String {
    match state.phase {
        LinkPhase::Connecting => format!("Connecting to {device}..."),
        LinkPhase::Connected => match &state.port {
            Some(port) => format!("Connected to {port}"),
            None => "Connected".to_string(),
        },
        LinkPhase::Disconnected => match state.faults.last() {
            Some(fault) => fault.clone(),
            None => "Disconnected".to_string(),
        },
    }
}

fn command_label(commanded: Option<Direction>) -> String {
    match commanded {
        Some(direction) => direction.to_string(),
        None => "idle".to_string(),
    }
}

fn status_color(state: &AppState) -> Color {
    match state.phase {
        LinkPhase::Connecting => GOLD,
        LinkPhase::Connected => DARKGREEN,
        LinkPhase::Disconnected if state.faults.is_empty() => GRAY,
        LinkPhase::Disconnected => RED,
    }
}

fn snap_speed(value: f32) -> f32 {
    ((value / SPEED_STEP).round() * SPEED_STEP).clamp(0.0, 1.0)
}

fn slider_fraction(track: Rect, mouse_x: f32) -> f32 {
    ((mouse_x - track.x) / track.w).clamp(0.0, 1.0)
}

fn draw_centered(text: &str, y: f32, size: f32, color: Color) {
    let measured = measure_text(text, None, size as u16, 1.0);
    draw_text(text, (WINDOW_W - measured.width) / 2.0, y, size, color);
}

/// Immediate-mode push button. Returns true on the frame the mouse goes
/// down over it, so holding it down fires exactly once.
fn button(rect: Rect, label: &str, enabled: bool) -> bool {
    let hovered = rect.contains(mouse_position().into());
    let held = hovered && enabled && is_mouse_button_down(MouseButton::Left);
    let fill = if !enabled {
        DARKGRAY
    } else if held {
        GOLD
    } else if hovered {
        SKYBLUE
    } else {
        WHITE
    };
    draw_rectangle(rect.x, rect.y, rect.w, rect.h, fill);
    draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 2.0, BLACK);
    let size = measure_text(label, None, 18, 1.0);
    draw_text(
        label,
        rect.x + (rect.w - size.width) / 2.0,
        rect.y + rect.h / 2.0 + size.height / 2.0,
        18.0,
        BLACK,
    );
    enabled && hovered && is_mouse_button_pressed(MouseButton::Left)
}

fn slider(track: Rect, value: f32) -> Option<f32> {
    draw_rectangle(track.x, track.y + track.h / 2.0 - 2.0, track.w, 4.0, GRAY);
    let knob_x = track.x + value * track.w;
    draw_circle(knob_x, track.y + track.h / 2.0, 8.0, DARKBLUE);

    let (mx, my) = mouse_position();
    let grab = Rect::new(track.x - 8.0, track.y - 8.0, track.w + 16.0, track.h + 16.0);
    if is_mouse_button_down(MouseButton::Left) && grab.contains(vec2(mx, my)) {
        let next = snap_speed(slider_fraction(track, mx));
        if (next - value).abs() > f32::EPSILON {
            return Some(next);
        }
    }
    None
}
