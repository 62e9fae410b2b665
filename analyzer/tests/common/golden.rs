use std::fs;
use std::path::{Path, PathBuf};

/// Runs golden-file comparisons for every `*.lua` file in `dir`, using `golden_ext` for the
/// expected files. `dir` is relative to the crate root.
///
/// The `render` callback receives the input path and source and returns the actual output.
pub fn run_golden_dir<F>(test_name: &str, dir: &Path, golden_ext: &str, mut render: F)
where
    F: FnMut(&Path, &str) -> String,
{
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join(dir);
    let mut inputs: Vec<PathBuf> = fs::read_dir(&dir)
        .unwrap_or_else(|e| panic!("failed to read test dir {:?}: {}", dir, e))
        .filter_map(|ent| ent.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("lua"))
        .collect();

    inputs.sort();
    assert!(!inputs.is_empty(), "no inputs in {:?}", dir);

    let bless = std::env::var("BLESS").is_ok();

    for input in inputs {
        let source = fs::read_to_string(&input)
            .unwrap_or_else(|e| panic!("failed to read {:?}: {}", input, e))
            .replace("\r\n", "\n");

        let actual = render(&input, &source);
        let golden_path = input.with_extension(golden_ext);

        if bless {
            write_golden(&golden_path, &source, &actual);
            continue;
        }

        let expected = fs::read_to_string(&golden_path).unwrap_or_else(|_| {
            write_golden(&golden_path, &source, &actual);
            panic!(
                "generated missing golden file for {:?}\n\
                 golden path: {:?}\n\
                 Review it, then re-run the tests (or run with BLESS=1 cargo test {}).",
                input, golden_path, test_name
            )
        });

        assert_eq!(
            normalize_output(&extract_output(&expected)),
            normalize_output(&actual),
            "golden mismatch\ninput: {:?}\ngolden: {:?}\nTo update: BLESS=1 cargo test {}",
            input,
            golden_path,
            test_name
        );
    }
}

const OUTPUT_MARKER: &str = "=== OUTPUT ===";

fn write_golden(path: &Path, source: &str, output: &str) {
    let mut contents = String::from("=== INPUT ===\n");
    contents.push_str(source);
    if !contents.ends_with('\n') {
        contents.push('\n');
    }
    contents.push_str(OUTPUT_MARKER);
    contents.push('\n');
    contents.push_str(&normalize_output(output));

    fs::write(path, contents)
        .unwrap_or_else(|e| panic!("failed to write golden file {:?}: {}", path, e));
}

fn extract_output(contents: &str) -> String {
    let Some(idx) = contents.find(OUTPUT_MARKER) else {
        return contents.to_string();
    };
    let after_marker = &contents[idx + OUTPUT_MARKER.len()..];
    after_marker
        .strip_prefix("\r\n")
        .or_else(|| after_marker.strip_prefix('\n'))
        .unwrap_or(after_marker)
        .to_string()
}

/// Trims trailing whitespace on each line and ends with a newline.
fn normalize_output(s: &str) -> String {
    let mut out = String::new();
    for line in s.lines() {
        out.push_str(line.trim_end());
        out.push('\n');
    }
    if out.is_empty() {
        out.push('\n');
    }
    out
}
