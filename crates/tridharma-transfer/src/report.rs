//! Printable HTML report of exported activities.

use std::fmt::Write as _;

use tridharma_core::activity::ExportRow;

/// Render `rows` as a self-contained A4 HTML document.
pub fn render_html(title: &str, rows: &[ExportRow]) -> String {
  let mut html = String::with_capacity(1024 + rows.len() * 256);
  let title = escape(title);

  html.push_str("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">");
  let _ = write!(html, "<title>{title}</title>");
  html.push_str(
    "<style>\
     @page { size: A4; margin: 15mm; }\
     body { font-family: sans-serif; font-size: 10pt; }\
     table { width: 100%; border-collapse: collapse; }\
     th, td { border: 1px solid #999; padding: 4px; vertical-align: top; }\
     th { background: #e8e8e8; }\
     td.data { font-family: monospace; font-size: 8pt; word-break: break-all; }\
     </style></head><body>",
  );
  let _ = write!(html, "<h1>{title}</h1><table><thead><tr>");
  for header in ExportRow::HEADERS {
    let _ = write!(html, "<th>{header}</th>");
  }
  html.push_str("</tr></thead><tbody>");

  for row in rows {
    let _ = write!(
      html,
      "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"data\">{}</td></tr>",
      row.id,
      escape(&row.kind),
      escape(row.department.as_deref().unwrap_or("")),
      escape(&row.owner_name),
      escape(&row.created_at),
      escape(row.data.as_deref().unwrap_or("")),
    );
  }

  html.push_str("</tbody></table></body></html>\n");
  html
}

fn escape(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      c => out.push(c),
    }
  }
  out
}
