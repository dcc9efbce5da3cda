use std::collections::hash_map::DefaultHasher;
use std::env;
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::path::PathBuf;
use std::process::{self, Command};

use csvrecord::{
    ConfigError, Error, Malformed, QuoteStyle, Reader, ReaderBuilder, Record,
    Terminator, Writer, WriterBuilder,
};

static SMALLPOP: &str = "\
city,region,country,population
Southborough,MA,United States,9686
Northbridge,MA,United States,14061
Westborough,MA,United States,29313
Marlborough,MA,United States,38334
Springfield,MA,United States,152227
";

macro_rules! reads_as {
    ($name:ident, $data:expr, $expected:expr) => {
        #[test]
        fn $name() {
            let expected: Vec<Vec<&str>> = $expected;
            assert_eq!(expected, read_all(Reader::from_reader($data.as_bytes())));
        }
    };
}

macro_rules! roundtrips {
    ($name:ident, $records:expr) => {
        roundtrips!($name, $records, |_: &mut WriterBuilder| {}, |_: &mut ReaderBuilder| {});
    };
    ($name:ident, $records:expr, $wconfig:expr, $rconfig:expr) => {
        #[test]
        fn $name() {
            let records: Vec<Record> =
                $records.iter().map(|r| Record::from(r.clone())).collect();

            let mut wbuilder = WriterBuilder::new();
            $wconfig(&mut wbuilder);
            let mut wtr = wbuilder.from_writer(vec![]).unwrap();
            for record in &records {
                wtr.write_record(record).unwrap();
            }
            let data = wtr.into_inner().unwrap();

            let mut rbuilder = ReaderBuilder::new();
            $rconfig(&mut rbuilder);
            let rdr = rbuilder.from_reader(&data[..]).unwrap();
            let got: Vec<Record> =
                rdr.into_records().collect::<Result<_, _>>().unwrap();
            assert_eq!(records, got);
        }
    };
}

fn read_all<R: std::io::Read>(rdr: Reader<R>) -> Vec<Vec<String>> {
    rdr.into_records().map(|r| r.unwrap().into()).collect()
}

fn hash(record: &Record) -> u64 {
    let mut hasher = DefaultHasher::new();
    record.hash(&mut hasher);
    hasher.finish()
}

reads_as!(empty_input, "", vec![]);
reads_as!(blank_line, "\n", vec![vec![""]]);
reads_as!(trailing_delimiter, "a,b,\n", vec![vec!["a", "b", ""]]);
reads_as!(quoted_delimiter, "a,\"b,c\",d\n", vec![vec!["a", "b,c", "d"]]);
reads_as!(doubled_quote, "a,\"b\"\"c\",d\n", vec![vec!["a", "b\"c", "d"]]);
reads_as!(
    multi_line_field,
    "a,\"line1\nline2\",b\n",
    vec![vec!["a", "line1\nline2", "b"]]
);
reads_as!(mid_field_quote, "a\"b,c\n", vec![vec!["a\"b", "c"]]);
reads_as!(no_final_terminator, "a,b\nc,d", vec![vec!["a", "b"], vec!["c", "d"]]);
reads_as!(
    mixed_terminators,
    "a\r\nb\rc\n",
    vec![vec!["a"], vec!["b"], vec!["c"]]
);
reads_as!(
    ragged_records,
    "a,b,c\nd\n,\n",
    vec![vec!["a", "b", "c"], vec!["d"], vec!["", ""]]
);

roundtrips!(
    roundtrip_tricky_fields,
    vec![
        vec!["plain", "", "with,comma", "with \"quote\""],
        vec!["line1\nline2", "cr\rlf\r\n", "\"", "\"\""],
        vec![""],
        vec!["", ""],
        vec![" padded ", "ünïcödé", "€,😀"],
    ]
);
roundtrips!(
    roundtrip_always_quote,
    vec![vec!["a", ""], vec![""], vec!["b\"c"]],
    |b: &mut WriterBuilder| {
        b.quote_style(QuoteStyle::Always);
    },
    |_: &mut ReaderBuilder| {}
);
roundtrips!(
    roundtrip_custom_chars,
    vec![vec!["a;b", "c'd", "e|f"], vec!["", "x"]],
    |b: &mut WriterBuilder| {
        b.delimiter(';').quote('\'').terminator(Terminator::Any('|'));
    },
    |b: &mut ReaderBuilder| {
        b.delimiter(';').quote('\'').terminator(Terminator::Any('|'));
    }
);
roundtrips!(
    roundtrip_escape,
    vec![vec!["a\"b", "c\\d", "\\\""]],
    |b: &mut WriterBuilder| {
        b.double_quote(false);
    },
    |b: &mut ReaderBuilder| {
        b.escape(Some('\\'));
    }
);
roundtrips!(
    roundtrip_quote_empty,
    vec![vec!["", "a", ""], vec![""]],
    |b: &mut WriterBuilder| {
        b.quote_empty(true).terminator(Terminator::Any('\n'));
    },
    |_: &mut ReaderBuilder| {}
);

#[test]
fn unterminated_quote() {
    let mut rdr = Reader::from_reader("a,\"unterminated\n".as_bytes());
    match rdr.read_next() {
        Err(Error::Malformed { kind, pos }) => {
            assert_eq!(Malformed::UnterminatedQuote, kind);
            assert_eq!(0, pos.record());
            assert_eq!(16, pos.byte());
        }
        res => panic!("expected malformed error, got {:?}", res),
    }
    assert!(matches!(rdr.read_next(), Err(Error::Poisoned)));
}

#[test]
fn no_partial_record_after_error() {
    let rdr = Reader::from_reader("a,b\nc,\"d\"e,f\ng,h\n".as_bytes());
    let results: Vec<_> = rdr.into_records().collect();
    assert_eq!(2, results.len());
    assert_eq!(&Record::from(vec!["a", "b"]), results[0].as_ref().unwrap());
    assert!(results[1].as_ref().unwrap_err().is_malformed());
}

#[test]
fn lenient_after_quote() {
    let rdr = ReaderBuilder::new()
        .lenient(true)
        .from_reader("\"a\" b,c\n".as_bytes())
        .unwrap();
    assert_eq!(vec![vec!["a b", "c"]], read_all(rdr));
}

#[test]
fn delimiter_equals_quote() {
    match ReaderBuilder::new().delimiter('"').from_reader("".as_bytes()) {
        Err(Error::Config(ConfigError::Conflict { ch: '"', .. })) => {}
        res => panic!("expected config error, got {:?}", res.map(|_| ())),
    }
    match WriterBuilder::new().quote(',').from_writer(vec![]) {
        Err(Error::Config(ConfigError::Conflict { ch: ',', .. })) => {}
        res => panic!("expected config error, got {:?}", res.map(|_| ())),
    }
}

#[test]
fn control_characters_rejected() {
    let res = ReaderBuilder::new().quote('\x07').from_reader("".as_bytes());
    assert!(matches!(res, Err(Error::Config(ConfigError::ControlCharacter { .. }))));
    let res = WriterBuilder::new().delimiter('\n').from_writer(vec![]);
    assert!(matches!(res, Err(Error::Config(ConfigError::ControlCharacter { .. }))));
}

#[test]
fn equality_ignores_read_only() {
    let mut rdr = Reader::from_reader("x,y\n".as_bytes());
    let record = rdr.read_next().unwrap().unwrap();
    let mut frozen = record.clone();
    frozen.make_read_only();
    assert_eq!(record, frozen);
    assert_eq!(hash(&record), hash(&frozen));
    assert!(matches!(frozen.set(0, "z"), Err(Error::ReadOnly)));
}

#[test]
fn headers_by_name() {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(SMALLPOP.as_bytes())
        .unwrap();
    let headers = rdr.headers().unwrap().unwrap().clone();
    let total: u64 = rdr
        .records()
        .map(|r| {
            let r = r.unwrap();
            headers.get("population", &r).unwrap().parse::<u64>().unwrap()
        })
        .sum();
    assert_eq!(9686 + 14061 + 29313 + 38334 + 152227, total);
    assert_eq!(6, rdr.position().record());
}

#[test]
fn headers_then_writer() {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(SMALLPOP.as_bytes())
        .unwrap();
    let mut wtr = WriterBuilder::new()
        .terminator(Terminator::Any('\n'))
        .from_writer(vec![])
        .unwrap();
    wtr.write_headers(rdr.headers().unwrap().unwrap()).unwrap();
    let mut record = Record::new();
    while rdr.read_record(&mut record).unwrap() {
        wtr.write_record(&record).unwrap();
    }
    let data = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
    assert_eq!(SMALLPOP, data);
}

#[test]
fn file_roundtrip() {
    let path = env::temp_dir()
        .join(format!("csvrecord-file-roundtrip-{}.csv", process::id()));
    {
        let mut wtr = Writer::from_path(&path).unwrap();
        wtr.write_record(&["a", "b,c"]).unwrap();
        wtr.write_record(&["d\ne", ""]).unwrap();
    }
    let rdr = Reader::from_path(&path).unwrap();
    let rows = read_all(rdr);
    std::fs::remove_file(&path).unwrap();
    assert_eq!(vec![vec!["a", "b,c"], vec!["d\ne", ""]], rows);
}

#[test]
fn missing_file() {
    let path = env::temp_dir().join("csvrecord-this-file-does-not-exist.csv");
    assert!(matches!(Reader::from_path(path), Err(Error::Io(_))));
}

#[test]
fn cookbook_read_basic() {
    let mut cmd = cmd_for_example("cookbook-read-basic");
    let out = cmd_output_with(&mut cmd, "a,\"b\nc\"\n\nd\n".as_bytes());
    assert_eq!(
        "Record([\"a\", \"b\\nc\"])\nRecord([\"\"])\nRecord([\"d\"])\n",
        out.stdout()
    );
}

#[test]
fn cookbook_read_basic_errored() {
    let mut cmd = cmd_for_example("cookbook-read-basic");
    let out = cmd_output_with(&mut cmd, "a,\"b\n".as_bytes());
    assert!(out.stdout_failed().contains("CSV parse error:"));
}

#[test]
fn cookbook_read_headers() {
    let mut cmd = cmd_for_example("cookbook-read-headers");
    cmd.arg("population");
    let out = cmd_output_with(&mut cmd, SMALLPOP.as_bytes());
    assert_eq!(
        vec!["9686", "14061", "29313", "38334", "152227"],
        out.stdout().lines().collect::<Vec<_>>()
    );
}

#[test]
fn cookbook_write_basic() {
    let mut cmd = cmd_for_example("cookbook-write-basic");
    let out = cmd_output(&mut cmd);
    let rdr = Reader::from_reader(out.stdout().as_bytes());
    let rows = read_all(rdr);
    assert_eq!(4, rows.len());
    assert_eq!(vec!["Concord", "MA", "United States, \"USA\"", "42695"], rows[3]);
}

// Helper functions follow.

/// Return the target/debug directory path.
fn debug_dir() -> PathBuf {
    env::current_exe()
        .expect("test binary path")
        .parent()
        .expect("test binary directory")
        .parent()
        .expect("example binary directory")
        .to_path_buf()
}

/// Return the directory containing the example test binaries.
fn example_bin_dir() -> PathBuf {
    debug_dir().join("examples")
}

/// Return the repo root directory path.
fn repo_dir() -> PathBuf {
    debug_dir()
        .parent()
        .expect("target directory")
        .parent()
        .expect("repo directory")
        .to_path_buf()
}

/// Return a command ready to execute the given demo binary.
///
/// The command's current directory is set to the repo root.
fn cmd_for_example(name: &str) -> Command {
    let mut cmd = Command::new(example_bin_dir().join(name));
    cmd.current_dir(repo_dir());
    cmd
}

/// Run the command and capture its output.
fn cmd_output(cmd: &mut Command) -> Output {
    cmd.stdout(process::Stdio::piped());
    cmd.stderr(process::Stdio::piped());
    let child = cmd.spawn().expect("command spawns successfully");
    Output::new(cmd, child)
}

/// Like cmd_output, but sends the given data as stdin to the given child.
fn cmd_output_with(cmd: &mut Command, data: &[u8]) -> Output {
    cmd.stdin(process::Stdio::piped());
    cmd.stdout(process::Stdio::piped());
    cmd.stderr(process::Stdio::piped());
    let mut child = cmd.spawn().expect("command spawns successfully");
    {
        let stdin = child.stdin.as_mut().expect("failed to get stdin");
        stdin.write_all(data).expect("failed to write to stdin");
    }
    Output::new(cmd, child)
}

struct Output {
    stdout: String,
    stderr: String,
    command: String,
    status: process::ExitStatus,
}

impl Output {
    fn new(cmd: &mut Command, child: process::Child) -> Output {
        let out = child.wait_with_output().expect("command runs successfully");
        let stdout =
            String::from_utf8(out.stdout).expect("valid utf-8 (stdout)");
        let stderr =
            String::from_utf8(out.stderr).expect("valid utf-8 (stderr)");
        Output {
            stdout,
            stderr,
            command: format!("{:?}", cmd),
            status: out.status,
        }
    }

    /// The child's stdout. Panics if the child failed.
    fn stdout(&self) -> &str {
        if !self.status.success() {
            self.fail("command failed but expected success!");
        }
        &self.stdout
    }

    /// The child's stdout. Panics if the child succeeded.
    fn stdout_failed(&self) -> &str {
        if self.status.success() {
            self.fail("command succeeded but expected failure!");
        }
        &self.stdout
    }

    fn fail(&self, msg: &str) -> ! {
        panic!(
            "\n\n==== {:?} ====\n\
             {}\
             \n\ncwd: {}\
             \n\nstatus: {}\
             \n\nstdout: {}\
             \n\nstderr: {}\
             \n\n=====\n",
            self.command,
            msg,
            repo_dir().display(),
            self.status,
            self.stdout,
            self.stderr
        );
    }
}
