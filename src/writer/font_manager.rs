//! Font management for PDF generation.
//!
//! Reports are set entirely in the Helvetica family, which every PDF viewer
//! ships as part of the Base-14 set. No font program is embedded: glyph
//! widths come from the Adobe AFM files and text is written in
//! WinAnsiEncoding, so anything outside that code page is replaced by `?`.

use std::collections::HashMap;

/// Style variant of the Helvetica family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    /// Helvetica
    #[default]
    Normal,
    /// Helvetica-Bold
    Bold,
    /// Helvetica-Oblique
    Italic,
    /// Helvetica-BoldOblique
    BoldItalic,
}

impl FontStyle {
    /// All styles, in resource order.
    pub const ALL: [FontStyle; 4] = [
        FontStyle::Normal,
        FontStyle::Bold,
        FontStyle::Italic,
        FontStyle::BoldItalic,
    ];

    /// PostScript name used as `/BaseFont`.
    pub fn base_font(self) -> &'static str {
        match self {
            FontStyle::Normal => "Helvetica",
            FontStyle::Bold => "Helvetica-Bold",
            FontStyle::Italic => "Helvetica-Oblique",
            FontStyle::BoldItalic => "Helvetica-BoldOblique",
        }
    }

    /// Name of the font in page resource dictionaries.
    pub fn resource_name(self) -> String {
        self.base_font().replace('-', "")
    }

    /// Whether glyphs come from the bold metrics.
    pub fn is_bold(self) -> bool {
        matches!(self, FontStyle::Bold | FontStyle::BoldItalic)
    }
}

/// Font manager for PDF generation.
///
/// Provides the metrics needed to measure and wrap text before it is placed.
#[derive(Debug, Clone)]
pub struct FontManager {
    fonts: HashMap<FontStyle, FontInfo>,
}

impl FontManager {
    /// Create a new font manager with the four Helvetica styles.
    pub fn new() -> Self {
        let fonts = FontStyle::ALL
            .iter()
            .map(|&style| (style, FontInfo::helvetica(style)))
            .collect();
        Self { fonts }
    }

    /// Get font info for a style.
    pub fn font(&self, style: FontStyle) -> Option<&FontInfo> {
        self.fonts.get(&style)
    }

    /// Width of `text` in points at `font_size`.
    pub fn text_width(&self, text: &str, style: FontStyle, font_size: f32) -> f32 {
        match self.font(style) {
            Some(font) => font.text_width(text, font_size),
            None => FontInfo::helvetica(style).text_width(text, font_size),
        }
    }

    /// Wrap text into lines no wider than `max_width` points.
    ///
    /// Explicit newlines always break. Words are packed greedily on spaces and
    /// a single word wider than the limit is split between characters. Empty
    /// input yields one empty line.
    pub fn wrap_text(
        &self,
        text: &str,
        style: FontStyle,
        font_size: f32,
        max_width: f32,
    ) -> Vec<String> {
        let width = |s: &str| self.text_width(s, style, font_size);
        let space_width = width(" ");
        let mut lines = Vec::new();

        for paragraph in text.split('\n') {
            let mut current_line = String::new();
            let mut current_width = 0.0;

            for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
                let word_width = width(word);

                if word_width > max_width {
                    if !current_line.is_empty() {
                        lines.push(std::mem::take(&mut current_line));
                    }
                    let mut pieces = split_long_word(word, max_width, &width);
                    // The tail of a broken word can still take following words.
                    if let Some(last) = pieces.pop() {
                        lines.extend(pieces);
                        current_width = width(&last);
                        current_line = last;
                    }
                } else if current_line.is_empty() {
                    current_line = word.to_string();
                    current_width = word_width;
                } else if current_width + space_width + word_width <= max_width {
                    current_line.push(' ');
                    current_line.push_str(word);
                    current_width += space_width + word_width;
                } else {
                    lines.push(std::mem::replace(&mut current_line, word.to_string()));
                    current_width = word_width;
                }
            }

            lines.push(current_line);
        }

        lines
    }
}

impl Default for FontManager {
    fn default() -> Self {
        Self::new()
    }
}

fn split_long_word(word: &str, max_width: f32, width: &dyn Fn(&str) -> f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    for ch in word.chars() {
        let mut candidate = piece.clone();
        candidate.push(ch);
        if !piece.is_empty() && width(&candidate) > max_width {
            pieces.push(std::mem::take(&mut piece));
            piece.push(ch);
        } else {
            piece = candidate;
        }
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

/// Information about a font.
#[derive(Debug, Clone)]
pub struct FontInfo {
    /// Style this entry describes
    pub style: FontStyle,
    /// Glyph widths for WinAnsi codes 32..=126, in 1/1000 em
    ascii_widths: &'static [u16; 95],
}

impl FontInfo {
    fn helvetica(style: FontStyle) -> Self {
        let ascii_widths = if style.is_bold() {
            &HELVETICA_BOLD_WIDTHS
        } else {
            &HELVETICA_WIDTHS
        };
        Self { style, ascii_widths }
    }

    /// Width of text in points for the given font size.
    ///
    /// Text is measured as it will be drawn, after WinAnsi substitution.
    pub fn text_width(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = encode_win_ansi(text)
            .into_iter()
            .map(|b| u32::from(self.code_width(b)))
            .sum();
        units as f32 * font_size / 1000.0
    }

    /// Width of a single WinAnsi code in font units (1/1000 em).
    pub fn code_width(&self, code: u8) -> u16 {
        let bold = self.style.is_bold();
        match code {
            32..=126 => self.ascii_widths[usize::from(code - 32)],
            0x80 | 0x96 => 556,
            0x85 | 0x97 => 1000,
            0x91 | 0x92 => {
                if bold {
                    278
                } else {
                    222
                }
            },
            0x93 | 0x94 => {
                if bold {
                    500
                } else {
                    333
                }
            },
            0x95 => 350,
            0xA0 => 278,
            _ => 500,
        }
    }
}

/// Encode text as WinAnsiEncoding bytes.
///
/// Latin-1 maps directly, common typographic punctuation maps to the
/// Windows-1252 extras, tabs become spaces and everything else becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            '\t' => b' ',
            ' '..='~' => ch as u8,
            '\u{A0}'..='\u{FF}' => ch as u32 as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}

#[rustfmt::skip]
static HELVETICA_WIDTHS: [u16; 95] = [
    // space ! " # $ % & ' ( ) * + , - . /
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 0-9
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    // : ; < = > ? @
    278, 278, 584, 584, 584, 556, 1015,
    // A-Z
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    // [ \ ] ^ _ `
    278, 278, 278, 469, 556, 333,
    // a-z
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    // { | } ~
    334, 260, 334, 584,
];

#[rustfmt::skip]
static HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];
