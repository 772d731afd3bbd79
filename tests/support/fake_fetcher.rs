//! A shell script that accepts yt-dlp's arguments and fakes its behaviours.
//!
//! Behaviour is picked from the source URL so every test can share one
//! script. The script is written exactly once per test binary, before any
//! test spawns it, which keeps "text file busy" races out of the picture.
//!
//! | URL contains | Behaviour |
//! |---|---|
//! | `/marker` | prints the size-ceiling marker, exits 0, writes nothing |
//! | `/big` | writes a 2 MiB artifact, exits 0 |
//! | `/fail` | prints an error to stderr, exits 1 |
//! | `/killed` | SIGKILLs itself |
//! | `/empty` | exits 0 without writing an artifact |
//! | `/slow?pidfile=<path>` | writes its pid to `<path>`, then sleeps 30s |
//! | `/straggler` | prints the size-ceiling marker, exits 0, leaves a helper holding stdout |
//! | anything else | writes a small artifact, exits 0 |

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use tempfile::TempDir;

pub const SIZE_MARKER_LINE: &str =
    "[download] File is larger than max-filesize (31457280 bytes > 10485760 bytes). Aborting.";

const SCRIPT: &str = r#"#!/bin/sh
received=$(printf '%s\n' "$@")
out=""
url=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift 2 ;;
    --max-filesize|--merge-output-format) shift 2 ;;
    *) url="$1"; shift ;;
  esac
done
[ -n "$out" ] && printf '%s\n' "$received" > "$out.args"

case "$url" in
  */marker*)
    echo "[info] 1: Downloading 1 format(s): 18"
    echo "__MARKER__"
    exit 0 ;;
  */big*)
    head -c 2097152 /dev/zero > "$out"
    exit 0 ;;
  */fail*)
    echo "ERROR: Unsupported URL: $url" >&2
    exit 1 ;;
  */killed*)
    kill -9 $$ ;;
  */empty*)
    exit 0 ;;
  */straggler*)
    echo "__MARKER__"
    sleep 30 &
    exit 0 ;;
  */slow*)
    echo $$ > "${url#*pidfile=}"
    exec sleep 30 ;;
  *)
    printf 'fake video for %s' "$url" > "$out"
    exit 0 ;;
esac
"#;

struct FakeFetcher {
    _dir: TempDir,
    path: PathBuf,
}

static FAKE_FETCHER: LazyLock<FakeFetcher> = LazyLock::new(|| {
    let dir = TempDir::new().expect("failed to create fetcher dir");
    let path = dir.path().join("fake-yt-dlp");
    std::fs::write(&path, SCRIPT.replace("__MARKER__", SIZE_MARKER_LINE))
        .expect("failed to write fake fetcher");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("failed to mark fake fetcher executable");
    FakeFetcher { _dir: dir, path }
});

/// Path of the shared fake fetcher.
pub fn fake_fetcher() -> &'static Path {
    &FAKE_FETCHER.path
}

/// Arguments the fake fetcher received for the run that wrote `output_path`.
pub fn recorded_args(output_path: &Path) -> Vec<String> {
    let args_path = PathBuf::from(format!("{}.args", output_path.display()));
    std::fs::read_to_string(args_path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}
