use std::panic::{AssertUnwindSafe, catch_unwind};

use docx_rs::{
    DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent, TableChild,
    TableRowChild,
};

use super::{DocumentError, DocumentKind, TextExtractor};

const PDF_MAGIC: &[u8] = b"%PDF";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Fewest letters or digits a text run needs to be kept from a legacy Word file.
const MIN_LEGACY_RUN: usize = 4;

fn decode_error(kind: DocumentKind, message: impl Into<String>) -> DocumentError {
    DocumentError::Decode {
        kind,
        message: message.into(),
    }
}

/// Text layer of a PDF, via `pdf-extract`.
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, DocumentError> {
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(decode_error(DocumentKind::Pdf, "missing PDF header"));
        }

        // pdf-extract panics on some malformed files
        match catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes))) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(decode_error(DocumentKind::Pdf, e.to_string())),
            Err(_) => Err(decode_error(DocumentKind::Pdf, "malformed PDF")),
        }
    }
}

/// Paragraph text of an Office Open XML document, via `docx-rs`.
///
/// Tables are read cell by cell, one line per cell paragraph. Hyperlink text
/// is kept inline.
pub struct DocxTextExtractor;

impl TextExtractor for DocxTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, DocumentError> {
        if !bytes.starts_with(ZIP_MAGIC) {
            return Err(decode_error(DocumentKind::Docx, "not a DOCX archive"));
        }

        let docx = docx_rs::read_docx(bytes)
            .map_err(|e| decode_error(DocumentKind::Docx, e.to_string()))?;

        let mut lines: Vec<String> = Vec::new();
        for child in docx.document.children.iter() {
            match child {
                DocumentChild::Paragraph(para) => push_line(&mut lines, paragraph_text(para)),
                DocumentChild::Table(table) => collect_table(table, &mut lines),
                _ => {}
            }
        }

        Ok(lines.join("\n"))
    }
}

fn push_line(lines: &mut Vec<String>, text: String) {
    if !text.trim().is_empty() {
        lines.push(text);
    }
}

fn paragraph_text(para: &Paragraph) -> String {
    let mut text = String::new();
    append_children(&para.children, &mut text);
    text
}

fn append_children(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for rc in run.children.iter() {
                    if let RunChild::Text(t) = rc {
                        out.push_str(&t.text);
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => append_children(&link.children, out),
            _ => {}
        }
    }
}

fn collect_table(table: &Table, lines: &mut Vec<String>) {
    for row in table.rows.iter() {
        let TableChild::TableRow(row) = row;
        for cell in row.cells.iter() {
            let TableRowChild::TableCell(cell) = cell;
            for content in cell.children.iter() {
                match content {
                    TableCellContent::Paragraph(para) => push_line(lines, paragraph_text(para)),
                    TableCellContent::Table(nested) => collect_table(nested, lines),
                    _ => {}
                }
            }
        }
    }
}

/// Best-effort reader for binary `.doc` files.
///
/// Keeps runs of printable 8-bit text and runs of UTF-16LE text whose code
/// units fall in Latin-1 or general punctuation, in file order. Formatting,
/// headers and anything outside those ranges are lost.
pub struct LegacyWordExtractor;

impl TextExtractor for LegacyWordExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, DocumentError> {
        if !bytes.starts_with(OLE_MAGIC) {
            return Err(decode_error(DocumentKind::Doc, "not a Word 97-2003 document"));
        }

        let body = &bytes[OLE_MAGIC.len()..];
        let mut runs = byte_runs(body);
        // UTF-16 text may start on either parity
        runs.extend(utf16_runs(body, 0));
        runs.extend(utf16_runs(body, 1));
        runs.sort_by_key(|(offset, _)| *offset);

        Ok(runs
            .into_iter()
            .map(|(_, text)| text)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Collects `(offset, text)` runs, keeping those with at least
/// [`MIN_LEGACY_RUN`] letters or digits.
struct RunCollector {
    runs: Vec<(usize, String)>,
    start: usize,
    current: String,
}

impl RunCollector {
    fn new() -> Self {
        Self {
            runs: Vec::new(),
            start: 0,
            current: String::new(),
        }
    }

    fn push(&mut self, offset: usize, c: char) {
        if self.current.is_empty() {
            self.start = offset;
        }
        self.current.push(c);
    }

    fn flush(&mut self) {
        let letters = self.current.chars().filter(|c| c.is_alphanumeric()).count();
        if letters >= MIN_LEGACY_RUN {
            self.runs.push((self.start, std::mem::take(&mut self.current)));
        } else {
            self.current.clear();
        }
    }

    fn finish(mut self) -> Vec<(usize, String)> {
        self.flush();
        self.runs
    }
}

fn byte_runs(body: &[u8]) -> Vec<(usize, String)> {
    let mut collector = RunCollector::new();
    for (offset, &b) in body.iter().enumerate() {
        match b {
            b' '..=b'~' | b'\t' => collector.push(offset, b as char),
            b'\r' | b'\n' => collector.push(offset, '\n'),
            _ => collector.flush(),
        }
    }
    collector.finish()
}

fn utf16_runs(body: &[u8], parity: usize) -> Vec<(usize, String)> {
    let mut collector = RunCollector::new();
    let Some(aligned) = body.get(parity..) else {
        return Vec::new();
    };

    for (idx, pair) in aligned.chunks_exact(2).enumerate() {
        let offset = parity + idx * 2;
        let unit = u16::from_le_bytes([pair[0], pair[1]]);
        match unit {
            0x0D | 0x0A => collector.push(offset, '\n'),
            0x09 | 0x20..=0x7E | 0xA0..=0xFF | 0x2010..=0x2027 => match char::from_u32(unit as u32) {
                Some(c) => collector.push(offset, c),
                None => collector.flush(),
            },
            _ => collector.flush(),
        }
    }
    collector.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_requires_header() {
        let err = PdfTextExtractor.extract(b"hello").unwrap_err();
        assert!(matches!(err, DocumentError::Decode { kind: DocumentKind::Pdf, .. }));
    }

    #[test]
    fn corrupt_pdf_is_a_decode_error() {
        let err = PdfTextExtractor.extract(b"%PDF-1.4\ngarbage").unwrap_err();
        assert!(matches!(err, DocumentError::Decode { .. }));
    }

    #[test]
    fn docx_requires_zip_container() {
        let err = DocxTextExtractor.extract(b"not a docx").unwrap_err();
        assert!(matches!(err, DocumentError::Decode { kind: DocumentKind::Docx, .. }));
    }

    fn pack(docx: docx_rs::Docx) -> Vec<u8> {
        let mut buf = std::io::Cursor::new(Vec::new());
        docx.build().pack(&mut buf).unwrap();
        buf.into_inner()
    }

    #[test]
    fn docx_reads_table_cells_and_hyperlinks() {
        use docx_rs::{Docx, Hyperlink, HyperlinkType, Run, TableCell, TableRow};

        let schedule = docx_rs::Table::new(vec![
            TableRow::new(vec![
                TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("Week 1"))),
                TableCell::new().add_paragraph(
                    Paragraph::new().add_run(Run::new().add_text("Graph theory and shortest paths")),
                ),
            ]),
            TableRow::new(vec![
                TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("Week 2"))),
                TableCell::new().add_paragraph(
                    Paragraph::new().add_run(Run::new().add_text("Network flows")),
                ),
            ]),
        ]);
        let docx = Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Course schedule")))
            .add_table(schedule)
            .add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text("Readings: "))
                    .add_hyperlink(
                        Hyperlink::new("https://example.org/notes", HyperlinkType::External)
                            .add_run(Run::new().add_text("lecture notes")),
                    ),
            );

        let text = DocxTextExtractor.extract(&pack(docx)).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Course schedule");
        assert!(text.contains("Graph theory and shortest paths"));
        assert!(text.contains("Network flows"));
        assert!(text.contains("Readings:"));
        assert!(text.contains("lecture notes"));
        let week1 = text.find("Week 1").unwrap();
        let week2 = text.find("Week 2").unwrap();
        assert!(week1 < week2);
    }

    #[test]
    fn legacy_word_reads_utf16_text() {
        let mut bytes = OLE_MAGIC.to_vec();
        bytes.extend_from_slice(b"Syllabus\0\0");
        for unit in "Week 1: caf\u{e9} \u{2013} logic".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes.extend_from_slice(&[0, 0, 0x01, 0x02]);

        let text = LegacyWordExtractor.extract(&bytes).unwrap();
        assert_eq!(text, "Syllabus\nWeek 1: caf\u{e9} \u{2013} logic");
    }

    #[test]
    fn legacy_word_keeps_printable_runs() {
        let mut bytes = OLE_MAGIC.to_vec();
        bytes.extend_from_slice(&[0, 1, 2]);
        bytes.extend_from_slice(b"Introduction to Databases");
        bytes.extend_from_slice(&[0, 0, b'a', b'b', 0xFF]);
        bytes.extend_from_slice(b"Normal forms\r");
        bytes.push(0);

        let text = LegacyWordExtractor.extract(&bytes).unwrap();
        assert_eq!(text, "Introduction to Databases\nNormal forms\n");
    }
}
