/// Geometry of a report page, in PDF points.
#[derive(Debug, Clone, Copy)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub font_size: f32,
    pub leading: f32,
    /// Rough line capacity for Helvetica at `font_size`.
    pub chars_per_line: usize,
}

impl Default for PageLayout {
    fn default() -> Self {
        // A4
        Self {
            width: 595.0,
            height: 842.0,
            margin: 50.0,
            font_size: 10.0,
            leading: 14.0,
            chars_per_line: 95,
        }
    }
}

impl PageLayout {
    /// Body lines that fit below the title block on the first page.
    pub fn first_page_lines(&self) -> usize {
        self.lines_between(self.height - self.margin - 40.0)
    }

    pub fn lines_per_page(&self) -> usize {
        self.lines_between(self.height - self.margin)
    }

    fn lines_between(&self, top: f32) -> usize {
        let usable = top - self.margin - 30.0;
        ((usable / self.leading).floor() as usize).max(1)
    }
}

/// Word-wrap `text` to at most `width` characters per line, keeping
/// explicit line breaks. Words longer than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for raw in text.lines() {
        let mut current = String::new();
        let mut len = 0usize;
        for word in raw.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if len > 0 {
                    lines.push(std::mem::take(&mut current));
                    len = 0;
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            let wlen = word.len();
            if len > 0 && len + 1 + wlen > width {
                lines.push(std::mem::take(&mut current));
                len = 0;
            }
            if len > 0 {
                current.push(' ');
                len += 1;
            }
            current.extend(word);
            len += wlen;
        }
        lines.push(current);
    }
    lines
}

/// Split wrapped lines into pages. Always yields at least one page.
pub fn paginate(lines: Vec<String>, layout: &PageLayout) -> Vec<Vec<String>> {
    let mut pages = Vec::new();
    let mut iter = lines.into_iter().peekable();
    let mut capacity = layout.first_page_lines();
    loop {
        let page: Vec<String> = iter.by_ref().take(capacity).collect();
        pages.push(page);
        if iter.peek().is_none() {
            break;
        }
        capacity = layout.lines_per_page();
    }
    pages
}
