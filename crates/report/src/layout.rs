//! Top-down page layout with automatic page breaks.
//!
//! Coordinates are whole PDF points on a US Letter page (612 x 792).

use crate::encoding::to_win_ansi;
use crate::metrics::char_width;
use lopdf::content::Operation;
use lopdf::{Object, StringFormat};
use petclause_text::wrap_measured;

pub(crate) const PAGE_WIDTH: i64 = 612;
pub(crate) const PAGE_HEIGHT: i64 = 792;

const LEFT: i64 = 50;
/// Right edge of the text area.
pub(crate) const RIGHT: i64 = PAGE_WIDTH - LEFT;
const TOP: i64 = 742;
const BOTTOM: i64 = 60;
const FOOTER_Y: i64 = 30;

const BODY_SIZE: i64 = 11;
const BODY_LEADING: i64 = 15;
const HEADING_SIZE: i64 = 13;
const HEADING_LEADING: i64 = 18;
const BLOCK_SIZE: i64 = 10;
const BLOCK_LEADING: i64 = 13;

const BULLET_INDENT: i64 = 10;
const HANGING_INDENT: i64 = 20;
const BLOCK_INDENT: i64 = 12;

/// Font resources registered on every page.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Font {
    Regular,
    Bold,
    Mono,
}

impl Font {
    pub(crate) const ALL: [Font; 3] = [Font::Regular, Font::Bold, Font::Mono];

    pub(crate) fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Mono => "F3",
        }
    }

    #[cfg(test)]
    pub(crate) fn from_resource(name: &[u8]) -> Option<Font> {
        Font::ALL
            .into_iter()
            .find(|font| font.resource().as_bytes() == name)
    }

    pub(crate) fn base_font(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Mono => "Courier",
        }
    }
}

/// Wrap `text` to fit between `x` and the right margin.
fn fit(text: &str, font: Font, size: i64, x: i64) -> Vec<String> {
    let max_units = ((RIGHT - x).max(1) * 1000 / size) as usize;
    wrap_measured(text, max_units, |c| char_width(font, c))
}

fn text_ops(font: Font, size: i64, x: i64, y: i64, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![
                Object::Name(font.resource().as_bytes().to_vec()),
                Object::Integer(size),
            ],
        ),
        Operation::new("Td", vec![Object::Integer(x), Object::Integer(y)]),
        Operation::new(
            "Tj",
            vec![Object::String(to_win_ansi(text), StringFormat::Literal)],
        ),
        Operation::new("ET", vec![]),
    ]
}

/// Accumulates content operations page by page.
pub(crate) struct Layout {
    pages: Vec<Vec<Operation>>,
    y: i64,
}

impl Layout {
    pub(crate) fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            y: TOP,
        }
    }

    fn current(&mut self) -> &mut Vec<Operation> {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.y = TOP;
    }

    /// Start a new page unless `height` more points fit on this one.
    fn reserve(&mut self, height: i64) {
        if self.y - height < BOTTOM {
            self.new_page();
        }
    }

    fn line(&mut self, font: Font, size: i64, x: i64, leading: i64, text: &str) {
        self.reserve(leading);
        self.y -= leading;
        if !text.is_empty() {
            let y = self.y;
            self.current().extend(text_ops(font, size, x, y, text));
        }
    }

    fn lines(&mut self, font: Font, size: i64, x: i64, leading: i64, text: &str) {
        for line in fit(text, font, size, x) {
            self.line(font, size, x, leading, &line);
        }
    }

    pub(crate) fn gap(&mut self, height: i64) {
        self.y -= height;
    }

    pub(crate) fn title(&mut self, text: &str) {
        self.lines(Font::Bold, 18, LEFT, 24, text);
        self.gap(6);
    }

    pub(crate) fn label(&mut self, text: &str) {
        self.lines(Font::Regular, BODY_SIZE, LEFT, BODY_LEADING, text);
    }

    /// Section heading, kept on the same page as its first two lines.
    pub(crate) fn heading(&mut self, text: &str) {
        self.gap(10);
        self.reserve(HEADING_LEADING + 2 * BODY_LEADING);
        self.lines(Font::Bold, HEADING_SIZE, LEFT, HEADING_LEADING, text);
        self.gap(4);
    }

    pub(crate) fn paragraph(&mut self, text: &str) {
        self.lines(Font::Regular, BODY_SIZE, LEFT, BODY_LEADING, text);
    }

    /// Bulleted item with hanging indent. The marker sits in the indent.
    pub(crate) fn bullet(&mut self, text: &str) {
        let x = LEFT + HANGING_INDENT;
        for (i, line) in fit(text, Font::Regular, BODY_SIZE, x).into_iter().enumerate() {
            self.line(Font::Regular, BODY_SIZE, x, BODY_LEADING, &line);
            if i == 0 {
                let y = self.y;
                self.current()
                    .extend(text_ops(Font::Regular, BODY_SIZE, LEFT + BULLET_INDENT, y, "•"));
            }
        }
    }

    /// Monospace block with a rule down its left edge.
    pub(crate) fn block(&mut self, text: &str) {
        for line in fit(text, Font::Mono, BLOCK_SIZE, LEFT + BLOCK_INDENT) {
            self.reserve(BLOCK_LEADING);
            let top = self.y;
            self.line(Font::Mono, BLOCK_SIZE, LEFT + BLOCK_INDENT, BLOCK_LEADING, &line);
            let y = self.y;
            self.current().extend(vec![
                Operation::new(
                    "re",
                    vec![
                        Object::Integer(LEFT),
                        Object::Integer(y - 3),
                        Object::Integer(3),
                        Object::Integer(top - y),
                    ],
                ),
                Operation::new("f", vec![]),
            ]);
        }
    }

    /// Finish layout, stamping a footer on every page.
    pub(crate) fn finish<F>(mut self, footer: F) -> Vec<Vec<Operation>>
    where
        F: Fn(usize, usize) -> String,
    {
        let total = self.pages.len();
        for (i, page) in self.pages.iter_mut().enumerate() {
            page.extend(text_ops(Font::Regular, 8, LEFT, FOOTER_Y, &footer(i + 1, total)));
        }
        self.pages
    }
}
