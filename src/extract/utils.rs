//! Byte-offset HTML helpers. No DOM; just enough tag scanning to find scripts,
//! tables, ARIA grids and visible text in server-rendered or dumped markup.
//!
//! All searches run over an ASCII-lowercased copy of the input. ASCII lowercasing
//! preserves byte offsets, so positions found in the copy slice the input.

/// Returns `(opening_tag, inner)` for each `<script type="application/json">` block.
pub fn iter_json_scripts(html: &str) -> Vec<(&str, &str)> {
    let lc = html.to_ascii_lowercase();
    let mut res = Vec::new();
    let mut pos = 0usize;

    while let Some(si) = find_open(&lc, "script", pos) {
        let open_end = match lc[si..].find('>') {
            Some(x) => si + x,
            None => break,
        };
        let tag_open = &html[si..=open_end];
        let is_json = lc[si..=open_end].contains("application/json");

        let close = match lc[open_end + 1..].find("</script>") {
            Some(x) => open_end + 1 + x,
            None => break,
        };
        if is_json {
            res.push((tag_open, &html[open_end + 1..close]));
        }
        pos = close + "</script>".len();
    }

    tracing::trace!(json_scripts = res.len(), "scanned script blocks");
    res
}

/// Index of the `}` closing the object that opens at `start`. String-literal aware.
pub fn find_matching_brace(s: &str, start: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.get(start).copied()? != b'{' {
        return None;
    }

    let mut depth = 0usize;
    let mut in_str = false;
    let mut j = start;

    while j < bytes.len() {
        let c = bytes[j];

        if in_str {
            if c == b'\\' {
                j += 2;
                continue;
            } else if c == b'"' {
                in_str = false;
            }
            j += 1;
            continue;
        }

        match c {
            b'"' => in_str = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(j);
                }
            }
            _ => {}
        }
        j += 1;
    }
    None
}

/* ---------------------- tag scanning ---------------------- */

fn is_tag_boundary(b: Option<u8>) -> bool {
    matches!(b, None | Some(b'>' | b'/' | b' ' | b'\t' | b'\n' | b'\r'))
}

/// Start of the next `<tag` (not `<tagfoo`) at or after `from`.
fn find_open(lc: &str, tag: &str, from: usize) -> Option<usize> {
    let pat = format!("<{tag}");
    let mut pos = from;
    while let Some(rel) = lc.get(pos..)?.find(&pat) {
        let at = pos + rel;
        if is_tag_boundary(lc.as_bytes().get(at + pat.len()).copied()) {
            return Some(at);
        }
        pos = at + pat.len();
    }
    None
}

/// Start of the next `</tag` at or after `from`.
fn find_close(lc: &str, tag: &str, from: usize) -> Option<usize> {
    let pat = format!("</{tag}");
    let mut pos = from;
    while let Some(rel) = lc.get(pos..)?.find(&pat) {
        let at = pos + rel;
        if is_tag_boundary(lc.as_bytes().get(at + pat.len()).copied()) {
            return Some(at);
        }
        pos = at + pat.len();
    }
    None
}

/// Byte range of the inner content of the element opening at `open_start`,
/// honouring nested elements of the same name.
fn element_inner(lc: &str, tag: &str, open_start: usize) -> Option<(usize, usize)> {
    let open_end = lc[open_start..].find('>')? + open_start;
    if lc.as_bytes().get(open_end.wrapping_sub(1)) == Some(&b'/') {
        return Some((open_end + 1, open_end + 1));
    }
    let inner_start = open_end + 1;
    let mut depth = 1usize;
    let mut pos = inner_start;

    loop {
        let next_close = match find_close(lc, tag, pos) {
            Some(c) => c,
            None => return Some((inner_start, lc.len())),
        };
        match find_open(lc, tag, pos) {
            Some(o) if o < next_close => {
                depth += 1;
                pos = o + 1;
            }
            _ => {
                depth -= 1;
                if depth == 0 {
                    return Some((inner_start, next_close));
                }
                pos = next_close + 1;
            }
        }
    }
}

/// Inner markup of every top-level `<table>` in document order.
pub fn tables(html: &str) -> Vec<&str> {
    let lc = html.to_ascii_lowercase();
    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some(start) = find_open(&lc, "table", pos) {
        let Some((a, b)) = element_inner(&lc, "table", start) else {
            break;
        };
        out.push(&html[a..b]);
        pos = b.max(start + 1);
    }
    out
}

/// Rows (`<tr>`) of a table, each as a list of raw cell markup (`<td>`/`<th>`).
/// Tolerates omitted end tags: a cell ends at the next cell or row boundary.
pub fn table_rows(table: &str) -> Vec<Vec<&str>> {
    let lc = table.to_ascii_lowercase();
    let mut rows = Vec::new();
    let mut pos = 0usize;

    while let Some(tr) = find_open(&lc, "tr", pos) {
        let Some(open_end) = lc[tr..].find('>').map(|x| tr + x + 1) else {
            break;
        };
        let row_end = [find_close(&lc, "tr", open_end), find_open(&lc, "tr", open_end)]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(lc.len());
        rows.push(row_cells(table, &lc, open_end, row_end));
        pos = row_end.max(tr + 1);
    }
    rows
}

fn next_cell_open(lc: &str, from: usize, limit: usize) -> Option<usize> {
    [find_open(lc, "td", from), find_open(lc, "th", from)]
        .into_iter()
        .flatten()
        .filter(|&p| p < limit)
        .min()
}

fn row_cells<'a>(src: &'a str, lc: &str, from: usize, limit: usize) -> Vec<&'a str> {
    let mut cells = Vec::new();
    let mut pos = from;
    while let Some(cell) = next_cell_open(lc, pos, limit) {
        let Some(inner_start) = lc[cell..limit].find('>').map(|x| cell + x + 1) else {
            break;
        };
        let end = [
            find_close(lc, "td", inner_start),
            find_close(lc, "th", inner_start),
            next_cell_open(lc, inner_start, limit),
        ]
        .into_iter()
        .flatten()
        .filter(|&p| p <= limit)
        .min()
        .unwrap_or(limit);
        cells.push(&src[inner_start..end]);
        pos = end.max(cell + 1);
    }
    cells
}

/// Rows of an ARIA grid (`role="row"` containing `role="cell"` and friends).
pub fn aria_rows(html: &str) -> Vec<Vec<&str>> {
    const CELL_ROLES: [&str; 4] = ["cell", "gridcell", "columnheader", "rowheader"];
    let lc = html.to_ascii_lowercase();
    let mut rows = Vec::new();
    let mut pos = 0usize;

    while let Some((start, tag)) = find_role(&lc, &["row"], pos) {
        let Some((a, b)) = element_inner(&lc, &tag, start) else {
            break;
        };
        let mut cells = Vec::new();
        let mut cpos = a;
        while let Some((cstart, ctag)) = find_role(&lc[..b], &CELL_ROLES, cpos) {
            let Some((ca, cb)) = element_inner(&lc[..b], &ctag, cstart) else {
                break;
            };
            cells.push(&html[ca..cb]);
            cpos = cb.max(cstart + 1);
        }
        rows.push(cells);
        pos = b.max(start + 1);
    }
    rows
}

/// Next element carrying one of `roles`; returns its start and tag name.
fn find_role(lc: &str, roles: &[&str], from: usize) -> Option<(usize, String)> {
    let mut best: Option<usize> = None;
    for role in roles {
        for quote in ['"', '\''] {
            let pat = format!("role={quote}{role}{quote}");
            if let Some(rel) = lc.get(from..).and_then(|s| s.find(&pat)) {
                let at = from + rel;
                best = Some(best.map_or(at, |b| b.min(at)));
            }
        }
    }
    let attr_at = best?;
    let start = lc[..attr_at].rfind('<')?;
    let tag: String = lc[start + 1..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    if tag.is_empty() {
        return None;
    }
    Some((start, tag))
}

/* ---------------------- text ---------------------- */

/// Text content of a cell: tags stripped, entities decoded, whitespace collapsed.
pub fn cell_text(markup: &str) -> String {
    normalize_ws(&decode_entities(&strip_tags(markup)))
}

/// Remove every `<...>` tag, keeping the text between them.
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Collapse runs of whitespace to one space and trim.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode the handful of entities that show up in tables plus numeric references.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').filter(|&semi| semi <= 10).and_then(|semi| {
            let name = &tail[1..semi];
            let ch = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" | "#39" => Some('\''),
                "nbsp" => Some(' '),
                _ => name
                    .strip_prefix("#x")
                    .or_else(|| name.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| name.strip_prefix('#').and_then(|d| d.parse().ok()))
                    .and_then(char::from_u32),
            }?;
            Some((ch, semi))
        });
        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Approximate `innerText`: drops scripts/styles, breaks lines at block
/// elements, keeps cells of a row on one line. Blank lines are removed.
pub fn visible_text(html: &str) -> String {
    const BLOCKS: [&str; 16] = [
        "br", "p", "div", "tr", "li", "ul", "ol", "table", "h1", "h2", "h3", "h4", "h5", "h6",
        "section", "article",
    ];

    let stripped = drop_elements(html, &["script", "style", "noscript", "template", "head"]);
    let lc = stripped.to_ascii_lowercase();
    let bytes = stripped.as_bytes();
    let mut out = String::with_capacity(stripped.len());
    let mut i = 0usize;

    while i < bytes.len() {
        if bytes[i] == b'<' {
            let end = lc[i..].find('>').map_or(lc.len(), |x| i + x + 1);
            let name: String = lc[i + 1..end]
                .trim_start_matches('/')
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric())
                .collect();
            if BLOCKS.contains(&name.as_str()) {
                out.push('\n');
            } else if name == "td" || name == "th" {
                out.push(' ');
            }
            i = end;
            continue;
        }
        let next = lc[i..].find('<').map_or(lc.len(), |x| i + x);
        out.push_str(&stripped[i..next]);
        i = next;
    }

    decode_entities(&out)
        .lines()
        .map(normalize_ws)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn drop_elements(html: &str, tags: &[&str]) -> String {
    let mut current = html.to_string();
    for tag in tags {
        let lc = current.to_ascii_lowercase();
        let mut out = String::with_capacity(current.len());
        let mut pos = 0usize;
        while let Some(start) = find_open(&lc, tag, pos) {
            out.push_str(&current[pos..start]);
            pos = match find_close(&lc, tag, start) {
                Some(close) => lc[close..].find('>').map_or(lc.len(), |x| close + x + 1),
                None => lc.len(),
            };
        }
        out.push_str(&current[pos..]);
        current = out;
    }
    current
}
