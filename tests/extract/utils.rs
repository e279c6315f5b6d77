use yolostocks_rs::extract::utils::{
    cell_text, decode_entities, find_matching_brace, table_rows, tables, visible_text,
};

#[test]
fn brace_matcher_ignores_braces_in_strings() {
    let s = r#"x = {"a":"}{","b":{"c":"\"}"}} tail"#;
    let start = s.find('{').unwrap();
    let end = find_matching_brace(s, start).unwrap();
    assert_eq!(&s[end + 1..], " tail");
    assert_eq!(find_matching_brace("{\"open\": 1", 0), None);
}

#[test]
fn rows_survive_omitted_end_tags_and_nesting() {
    let html = "<TABLE><tr><td>1<td>GME<tr><td>2</td><td><b>AMC</b></td></tr>\
                <tr><td><table><tr><td>inner</td></tr></table></td></tr></TABLE>";
    let outer = tables(html);
    assert_eq!(outer.len(), 1);
    let rows = table_rows(outer[0]);
    assert_eq!(cell_text(rows[0][1]), "GME");
    assert_eq!(cell_text(rows[1][1]), "AMC");
}

#[test]
fn entities_and_visible_text() {
    assert_eq!(decode_entities("a&amp;b &#36;5 &#x25; &nbsp;&bogus;"), "a&b $5 %  &bogus;");
    let text = visible_text(
        "<html><head><title>t</title></head><body><script>var X = 1;</script>\
         <h1>Top</h1><table><tr><td>GME</td><td>1432</td></tr></table>\
         <p>a &lt; b</p></body></html>",
    );
    assert_eq!(text, "Top\nGME 1432\na < b");
}
