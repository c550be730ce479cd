//! Single-screen layout: header with title and badge, one marquee line, and a
//! footer naming where the line came from.

use embedded_graphics::{
    mono_font::{
        MonoFont, MonoTextStyle,
        ascii::{FONT_6X10, FONT_10X20},
    },
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Line, PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};

use beacon_core::{
    render::{Badge, BadgeTone, Screen},
    scroll::GLYPH_ADVANCE_PX,
    sync::Provenance,
};

use super::FrameRenderer;
use crate::platform::{
    frame::FrameBuffer,
    protocol::{HEIGHT, WIDTH},
};

const MARGIN_X: i32 = 12;
const HEADER_TOP: i32 = 8;
const DIVIDER_Y: i32 = 36;
const BADGE_PAD: i32 = 3;
pub const MARQUEE_TOP: i32 = 110;
const FOOTER_TOP: i32 = HEIGHT as i32 - 22;
const RECONNECTING: &str = "RECONNECTING";
const DOTS: &str = "...";

const INK: BinaryColor = BinaryColor::On;
const PAPER: BinaryColor = BinaryColor::Off;

/// Draws [`Screen`]s with the built-in mono fonts. The marquee font's advance
/// matches the core's glyph width so wrap points line up with what is drawn.
#[derive(Debug, Default)]
pub struct MarqueeRenderer;

impl MarqueeRenderer {
    pub const fn new() -> Self {
        Self
    }

    fn draw_header(&self, frame: &mut FrameBuffer, title: &str, badge: Option<Badge<'_>>) {
        draw_text(frame, title, Point::new(MARGIN_X, HEADER_TOP), &FONT_10X20, INK);
        let _ = Line::new(
            Point::new(0, DIVIDER_Y),
            Point::new(WIDTH as i32 - 1, DIVIDER_Y),
        )
        .into_styled(PrimitiveStyle::with_stroke(INK, 1))
        .draw(frame);

        if let Some(badge) = badge {
            draw_badge(frame, badge);
        }
    }
}

impl FrameRenderer for MarqueeRenderer {
    fn render(&mut self, screen: Screen<'_>, frame: &mut FrameBuffer) {
        frame.fill(false);

        match screen {
            Screen::Message {
                title,
                text,
                offset_px,
                provenance,
                badge,
            } => {
                self.draw_header(frame, title, badge);
                draw_text(
                    frame,
                    text,
                    Point::new(offset_px, MARQUEE_TOP),
                    &FONT_10X20,
                    INK,
                );

                let footer = match provenance {
                    Some(Provenance::Local) => Some("SENT FROM HERE >>"),
                    Some(Provenance::Remote) => Some("<< FROM INBOX"),
                    None => None,
                };
                if let Some(footer) = footer {
                    draw_text(frame, footer, Point::new(MARGIN_X, FOOTER_TOP), &FONT_6X10, INK);
                }
            }
            Screen::Reconnecting { title, dots } => {
                self.draw_header(frame, title, None);

                let dots = &DOTS[..usize::from(dots).min(DOTS.len())];
                let width = text_width(RECONNECTING, &FONT_10X20) + text_width(DOTS, &FONT_10X20);
                let x = (WIDTH as i32 - width) / 2;
                let next = draw_text(
                    frame,
                    RECONNECTING,
                    Point::new(x, MARQUEE_TOP),
                    &FONT_10X20,
                    INK,
                );
                draw_text(frame, dots, next, &FONT_10X20, INK);
            }
        }
    }
}

fn draw_badge(frame: &mut FrameBuffer, badge: Badge<'_>) {
    let width = text_width(badge.label, &FONT_6X10) + BADGE_PAD * 2;
    let height = FONT_6X10.character_size.height as i32 + BADGE_PAD * 2;
    let top_left = Point::new(WIDTH as i32 - MARGIN_X - width, HEADER_TOP + 2);
    let bounds = Rectangle::new(top_left, Size::new(width as u32, height as u32));

    let (fill, text) = match badge.tone {
        BadgeTone::Plain => (PrimitiveStyle::with_stroke(INK, 1), INK),
        BadgeTone::Alert => (PrimitiveStyle::with_fill(INK), PAPER),
    };
    let _ = bounds.into_styled(fill).draw(frame);
    draw_text(
        frame,
        badge.label,
        top_left + Point::new(BADGE_PAD, BADGE_PAD),
        &FONT_6X10,
        text,
    );
}

fn draw_text(
    frame: &mut FrameBuffer,
    text: &str,
    origin: Point,
    font: &MonoFont<'_>,
    color: BinaryColor,
) -> Point {
    let style = MonoTextStyle::new(font, color);
    Text::with_baseline(text, origin, style, Baseline::Top)
        .draw(frame)
        .unwrap_or(origin)
}

fn text_width(text: &str, font: &MonoFont<'_>) -> i32 {
    let advance = (font.character_size.width + font.character_spacing) as i32;
    text.chars().count() as i32 * advance
}

/// The marquee font must advance exactly one core glyph per character.
const _: () = assert!(FONT_10X20.character_size.width as i32 == GLYPH_ADVANCE_PX);
