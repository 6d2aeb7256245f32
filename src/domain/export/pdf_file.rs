//! Minimal PDF 1.4 writer for the restock table.
//!
//! Only the standard Helvetica fonts are used, so no font embedding is needed; every string is
//! folded to ASCII first (see [`super::ascii`]).

use super::ascii::to_ascii;
use crate::domain::analytics::RestockItem;
use chrono::NaiveDate;

const PAGE_WIDTH: u32 = 595;
const PAGE_HEIGHT: u32 = 842;
const MARGIN_LEFT: u32 = 50;
const ROWS_PER_PAGE: usize = 36;
const ROW_HEIGHT: u32 = 18;
const FONT_SIZE: u32 = 10;
const MIN_NAME_FONT_SIZE: u32 = 5;
/// Name characters that fit the first column at [`FONT_SIZE`].
const NAME_CHARS_AT_FULL_SIZE: usize = 48;
const MAX_NAME_LINES: usize = 3;
const NAME_LEADING: u32 = 6;
/// x positions of: name, quantity, minimum, to order.
const COLUMNS: [u32; 4] = [50, 330, 410, 490];

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const FONT_ID: usize = 3;
const FONT_BOLD_ID: usize = 4;
const FIRST_PAGE_ID: usize = 5;

struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new(object_count: usize) -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n");
        Self {
            buf,
            offsets: vec![0; object_count],
        }
    }

    fn object(&mut self, id: usize, body: &str) {
        self.offsets[id - 1] = self.buf.len();
        self.buf
            .extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", id, body).as_bytes());
    }

    fn stream(&mut self, id: usize, content: &str) {
        let body = format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        );
        self.object(id, &body);
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_offset = self.buf.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", self.offsets.len() + 1);
        for offset in &self.offsets {
            xref.push_str(&format!("{:010} 00000 n \n", offset));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {} /Root {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            self.offsets.len() + 1,
            CATALOG_ID,
            xref_offset
        ));
        self.buf.extend_from_slice(xref.as_bytes());
        self.buf
    }
}

/// Escapes a PDF literal string.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in to_ascii(text).chars() {
        if matches!(c, '(' | ')' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn text(content: &mut String, font: &str, size: u32, x: u32, y: u32, value: &str) {
    content.push_str(&format!(
        "BT /{} {} Tf {} {} Td ({}) Tj ET\n",
        font,
        size,
        x,
        y,
        escape(value)
    ));
}

/// Lays a product name out in the first column: long names get a smaller font, and past the
/// smallest size they wrap onto up to [`MAX_NAME_LINES`] lines within the row.
fn name_lines(name: &str) -> (u32, Vec<String>) {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= NAME_CHARS_AT_FULL_SIZE {
        return (FONT_SIZE, vec![name.to_string()]);
    }
    let size = (FONT_SIZE as usize * NAME_CHARS_AT_FULL_SIZE / chars.len()) as u32;
    if size >= MIN_NAME_FONT_SIZE {
        return (size, vec![name.to_string()]);
    }

    let per_line = NAME_CHARS_AT_FULL_SIZE * (FONT_SIZE / MIN_NAME_FONT_SIZE) as usize;
    let mut lines: Vec<String> = chars
        .chunks(per_line)
        .map(|chunk| chunk.iter().collect())
        .collect();
    if lines.len() > MAX_NAME_LINES {
        lines.truncate(MAX_NAME_LINES);
        if let Some(last) = lines.last_mut() {
            *last = last.chars().take(per_line - 3).collect::<String>() + "...";
        }
    }
    (MIN_NAME_FONT_SIZE, lines)
}

fn page_content(
    rows: &[RestockItem],
    page: usize,
    page_count: usize,
    generated_on: NaiveDate,
) -> String {
    let mut content = String::new();
    let top = PAGE_HEIGHT - 42;
    text(&mut content, "F2", 16, MARGIN_LEFT, top, "Restock order");
    text(
        &mut content,
        "F1",
        9,
        MARGIN_LEFT,
        top - 18,
        &format!(
            "Generated {}  -  page {} of {}",
            generated_on.format("%Y-%m-%d"),
            page + 1,
            page_count
        ),
    );

    let header_y = top - 50;
    for (x, label) in COLUMNS.iter().zip(["Product", "Quantity", "Minimum", "To order"]) {
        text(&mut content, "F2", 10, *x, header_y, label);
    }
    content.push_str(&format!(
        "0.5 w {} {} m {} {} l S\n",
        MARGIN_LEFT,
        header_y - 6,
        PAGE_WIDTH - MARGIN_LEFT,
        header_y - 6
    ));

    if rows.is_empty() {
        text(
            &mut content,
            "F1",
            10,
            MARGIN_LEFT,
            header_y - ROW_HEIGHT - 4,
            "Nothing to restock: every product is at or above its minimum.",
        );
        return content;
    }

    let mut y = header_y - ROW_HEIGHT - 4;
    for row in rows {
        let (size, lines) = name_lines(&row.name);
        let first_y = y + NAME_LEADING / 2 * (lines.len() as u32 - 1);
        for (i, line) in lines.iter().enumerate() {
            let line_y = first_y - NAME_LEADING * i as u32;
            text(&mut content, "F1", size, COLUMNS[0], line_y, line);
        }
        let cells = [
            row.quantity.to_string(),
            row.min_stock.to_string(),
            row.to_order.to_string(),
        ];
        for (x, cell) in COLUMNS[1..].iter().zip(cells.iter()) {
            text(&mut content, "F1", FONT_SIZE, *x, y, cell);
        }
        y -= ROW_HEIGHT;
    }
    content
}

/// Renders the restock list as a paginated PDF table.
pub fn restock_pdf(items: &[RestockItem], generated_on: NaiveDate) -> Vec<u8> {
    let pages: Vec<&[RestockItem]> = if items.is_empty() {
        vec![items]
    } else {
        items.chunks(ROWS_PER_PAGE).collect()
    };
    let page_count = pages.len();
    let mut pdf = PdfWriter::new(FIRST_PAGE_ID - 1 + page_count * 2);

    pdf.object(CATALOG_ID, &format!("<< /Type /Catalog /Pages {} 0 R >>", PAGES_ID));
    let kids: Vec<String> = (0..page_count)
        .map(|i| format!("{} 0 R", FIRST_PAGE_ID + i * 2))
        .collect();
    pdf.object(
        PAGES_ID,
        &format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            page_count
        ),
    );
    pdf.object(
        FONT_ID,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
    );
    pdf.object(
        FONT_BOLD_ID,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
    );

    for (i, rows) in pages.iter().enumerate() {
        let page_id = FIRST_PAGE_ID + i * 2;
        let content_id = page_id + 1;
        pdf.object(
            page_id,
            &format!(
                "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {} {}] \
                 /Resources << /Font << /F1 {} 0 R /F2 {} 0 R >> >> /Contents {} 0 R >>",
                PAGES_ID, PAGE_WIDTH, PAGE_HEIGHT, FONT_ID, FONT_BOLD_ID, content_id
            ),
        );
        pdf.stream(content_id, &page_content(rows, i, page_count, generated_on));
    }

    pdf.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<RestockItem> {
        (0..n)
            .map(|i| RestockItem {
                product_id: i as i64,
                name: format!("Item {}", i),
                quantity: 1,
                min_stock: 5,
                to_order: 4,
            })
            .collect()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn as_text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn empty_list_is_a_single_page() {
        let pdf = as_text(&restock_pdf(&[], date()));
        assert!(pdf.starts_with("%PDF-1.4"));
        assert!(pdf.ends_with("%%EOF\n"));
        assert!(pdf.contains("/Count 1"));
        assert!(pdf.contains("Nothing to restock"));
    }

    #[test]
    fn paginates_rows() {
        let pdf = as_text(&restock_pdf(&items(ROWS_PER_PAGE * 2 + 1), date()));
        assert!(pdf.contains("/Count 3"));
        assert!(pdf.contains("page 3 of 3"));
        assert!(pdf.contains(&format!("(Item {})", ROWS_PER_PAGE * 2)));
    }

    #[test]
    fn names_are_folded_and_escaped() {
        let mut list = items(1);
        list[0].name = "Śruba (M6) \\ ocynk".to_string();
        let pdf = as_text(&restock_pdf(&list, date()));
        assert!(pdf.contains("(Sruba \\(M6\\) \\\\ ocynk) Tj"));
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let bytes = restock_pdf(&items(40), date());
        let pdf = as_text(&bytes);

        let startxref = pdf.rfind("startxref\n").unwrap() + "startxref\n".len();
        let xref_offset: usize = pdf[startxref..].lines().next().unwrap().parse().unwrap();
        assert!(pdf[xref_offset..].starts_with("xref\n"));

        let entries: Vec<&str> = pdf[xref_offset..]
            .lines()
            .skip(3)
            .take_while(|l| l.ends_with(" n "))
            .collect();
        assert_eq!(entries.len(), FIRST_PAGE_ID - 1 + 2 * 2);
        for (i, entry) in entries.iter().enumerate() {
            let offset: usize = entry[..10].parse().unwrap();
            assert!(pdf[offset..].starts_with(&format!("{} 0 obj", i + 1)));
        }
    }

    #[test]
    fn long_names_shrink_before_they_wrap() {
        let (size, lines) = name_lines("Hammer");
        assert_eq!((size, lines.len()), (FONT_SIZE, 1));

        let (size, lines) = name_lines(&"x".repeat(NAME_CHARS_AT_FULL_SIZE + 12));
        assert_eq!(size, 8);
        assert_eq!(lines[0].len(), NAME_CHARS_AT_FULL_SIZE + 12);

        let name = "y".repeat(250);
        let (size, lines) = name_lines(&name);
        assert_eq!(size, MIN_NAME_FONT_SIZE);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines.concat(), name);
    }

    #[test]
    fn wrapped_names_stay_complete_in_the_document() {
        let mut list = items(1);
        list[0].name = format!("{}{}", "a".repeat(96), "b".repeat(20));
        let pdf = as_text(&restock_pdf(&list, date()));
        assert!(pdf.contains(&format!("/F1 5 Tf 50 {} Td ({}) Tj", 731, "a".repeat(96))));
        assert!(pdf.contains(&format!("/F1 5 Tf 50 {} Td ({}) Tj", 725, "b".repeat(20))));
    }
}
