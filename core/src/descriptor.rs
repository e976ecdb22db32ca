//! Static descriptors for catalog members.
//!
//! Catalog and rendering collaborators show these next to detected
//! artifacts; they carry no behavior.

use serde::Serialize;

use crate::ArtifactType;

/// Human-facing metadata for one artifact type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactDescriptor {
    pub artifact_type: ArtifactType,
    pub file_extension: &'static str,
    pub short_description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_url: Option<&'static str>,
    /// Source type this one is normalized from, for converted artifacts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_from: Option<ArtifactType>,
}

impl ArtifactType {
    /// Returns the static descriptor for this type.
    ///
    /// # Examples
    ///
    /// ```
    /// use artifact_detective_core::ArtifactType;
    ///
    /// let descriptor = ArtifactType::PytestJson.descriptor();
    /// assert_eq!(descriptor.file_extension, "json");
    /// assert_eq!(descriptor.normalized_from, Some(ArtifactType::PytestHtml));
    /// ```
    pub fn descriptor(self) -> ArtifactDescriptor {
        use ArtifactType::*;

        let (short_description, tool_url, normalized_from) = match self {
            PlaywrightJson => (
                "Playwright JSON reporter results",
                Some("https://playwright.dev/docs/test-reporters#json-reporter"),
                Some(PlaywrightHtml),
            ),
            JestJson => ("Jest test results (--json)", Some("https://jestjs.io/docs/cli#--json"), None),
            JestHtml => ("Jest HTML report", Some("https://github.com/Hargne/jest-html-reporter"), None),
            PytestJson => (
                "pytest results in pytest-json-report shape",
                Some("https://github.com/numirias/pytest-json-report"),
                Some(PytestHtml),
            ),
            PytestHtml => ("pytest-html report", Some("https://pytest-html.readthedocs.io/"), None),
            PlaywrightHtml => ("Playwright HTML report", Some("https://playwright.dev/docs/test-reporters#html-reporter"), None),
            JunitXml => ("JUnit-style XML test results", None, None),
            CheckstyleXml => ("Checkstyle XML violations", Some("https://checkstyle.org/"), None),
            CheckstyleSarifJson => ("SARIF static analysis log", Some("https://sarifweb.azurewebsites.net/"), None),
            SpotbugsXml => ("SpotBugs XML bug collection", Some("https://spotbugs.github.io/"), None),
            SurefireHtml => ("Maven Surefire HTML report", Some("https://maven.apache.org/surefire/"), None),
            EslintJson => ("ESLint JSON formatter output", Some("https://eslint.org/docs/latest/use/formatters/"), None),
            MypyNdjson => ("mypy JSON lines output", Some("https://mypy-lang.org/"), None),
            MypyJson => ("mypy diagnostics as a JSON array", Some("https://mypy-lang.org/"), Some(MypyNdjson)),
            EslintTxt => ("ESLint stylish text output", Some("https://eslint.org/"), None),
            TscTxt => ("TypeScript compiler diagnostics", Some("https://www.typescriptlang.org/"), None),
            RuffTxt => ("Ruff lint output", Some("https://docs.astral.sh/ruff/"), None),
            MypyTxt => ("mypy text output", Some("https://mypy-lang.org/"), None),
            Flake8Txt => ("flake8 lint output", Some("https://flake8.pycqa.org/"), None),
            PylintTxt => ("pylint text output", Some("https://pylint.readthedocs.io/"), None),
            PrettierTxt => ("Prettier --check output", Some("https://prettier.io/"), None),
            BlackTxt => ("Black --check output", Some("https://black.readthedocs.io/"), None),
            IsortTxt => ("isort --check-only output", Some("https://pycqa.github.io/isort/"), None),
            CargoTestTxt => ("cargo test output", Some("https://doc.rust-lang.org/cargo/commands/cargo-test.html"), None),
            ClippyNdjson => ("Clippy JSON messages, one per line", Some("https://doc.rust-lang.org/clippy/"), None),
            ClippyJson => ("Clippy messages as a JSON array", Some("https://doc.rust-lang.org/clippy/"), Some(ClippyNdjson)),
            ClippyTxt => ("Clippy human-readable output", Some("https://doc.rust-lang.org/clippy/"), None),
            RustfmtTxt => ("rustfmt --check diff output", Some("https://rust-lang.github.io/rustfmt/"), None),
            GofmtTxt => ("gofmt file list or diff output", Some("https://pkg.go.dev/cmd/gofmt"), None),
            GoTestNdjson => ("go test -json event stream", Some("https://pkg.go.dev/cmd/test2json"), None),
            Binary => ("Binary file (image, video, archive)", None, None),
        };

        ArtifactDescriptor {
            artifact_type: self,
            file_extension: self.original_format().file_extension(),
            short_description,
            tool_url,
            normalized_from,
        }
    }
}
