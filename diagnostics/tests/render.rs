use diagnostics::diagnostic_from_syntax_error;
use diagnostics::files::SimpleFiles;
use diagnostics::render::render_diagnostic;

#[test]
fn renders_parse_errors_with_carets() {
  let mut files = SimpleFiles::new();
  let text = "struct S {\n  1: i32\n}\n";
  let file = files.add("broken.thrift", text);
  let err = parse_thrift::parse(text).unwrap_err();

  let diagnostic = diagnostic_from_syntax_error(file, &err);
  let rendered = render_diagnostic(&files, &diagnostic);
  let expected = concat!(
    "error[PS0002]: expected token Identifier, found BraceClose\n",
    " --> broken.thrift:3:1\n",
    "  |\n",
    "3 | }\n",
    "  | ^ expected token Identifier, found BraceClose\n",
  );
  assert_eq!(rendered, expected);
}

#[test]
fn renders_errors_at_end_of_input() {
  let mut files = SimpleFiles::new();
  let text = "enum E {";
  let file = files.add("eof.thrift", text);
  let err = parse_thrift::parse(text).unwrap_err();

  let rendered = render_diagnostic(&files, &diagnostic_from_syntax_error(file, &err));
  assert!(rendered.starts_with("error[PS0003]: unexpected end of input\n"));
  assert!(rendered.contains(" --> eof.thrift:1:9"));
}
