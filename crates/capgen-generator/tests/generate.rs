use capgen_conf::AmbiguityPolicy;
use capgen_generator::model::ArtifactKind;
use capgen_generator::model::GeneratedArtifact;
use capgen_generator::naming::identity_hash;
use capgen_generator::GenerationOutput;
use capgen_generator::Generator;
use capgen_generator::GeneratorDiagnostic;
use capgen_generator::GeneratorOptions;
use capgen_python::Program;
use capgen_source::SourceFile;

const LIB: &str = "\
from typing import Callable

from capture import Capture


def test(insp: Capture[Callable[[int], int]]) -> None:
    pass
";

const MAIN: &str = "\
from lib import test

test(lambda x: 3 * x)
test(lambda x: x * 10)
";

fn program(files: &[(&str, &str)]) -> Program {
    Program::from_files(
        files
            .iter()
            .map(|(path, source)| SourceFile::new(*path, (*source).to_string())),
    )
}

fn generate_with(files: &[(&str, &str)], options: GeneratorOptions) -> GenerationOutput {
    Generator::new(options).generate(&program(files)).unwrap()
}

fn generate(files: &[(&str, &str)]) -> GenerationOutput {
    generate_with(files, GeneratorOptions::default())
}

fn names(artifacts: &[GeneratedArtifact]) -> Vec<&str> {
    artifacts.iter().map(|a| a.name.as_str()).collect()
}

fn text<'a>(output: &'a GenerationOutput, name: &str) -> &'a str {
    &output
        .artifact(name)
        .unwrap_or_else(|| panic!("missing artifact {name}: {:?}", names(&output.artifacts)))
        .text
}

#[test]
fn two_lambdas_two_interceptors() {
    let output = generate(&[("lib.py", LIB), ("main.py", MAIN)]);

    assert_eq!(
        names(&output.artifacts),
        vec![
            "lib_test_Overload.g.py",
            "Intercepted_test_main_py_3_1.g.py",
            "Intercepted_test_main_py_4_1.g.py",
            "capture_interception.g.py",
        ]
    );
    assert!(output.diagnostics.is_empty());

    let sites: Vec<_> = output.call_sites.iter().map(|s| s.id.to_string()).collect();
    assert_eq!(sites, vec!["main.py:3:1", "main.py:4:1"]);
    assert_eq!(output.call_sites[0].captures[0].text, "lambda x: 3 * x");
    assert_eq!(output.call_sites[1].captures[0].text, "lambda x: x * 10");
}

#[test]
fn overload_text() {
    let output = generate(&[("lib.py", LIB), ("main.py", MAIN)]);
    insta::assert_snapshot!(text(&output, "lib_test_Overload.g.py"), @r###"
# <auto-generated/>
from typing import Callable

def test(insp: Callable[[int], int]) -> None:
    """Stand-in for `lib.test` taking captured arguments as their inner type."""
    return
"###);
}

#[test]
fn interceptor_text() {
    let output = generate(&[("lib.py", LIB), ("main.py", MAIN)]);
    insta::assert_snapshot!(text(&output, "Intercepted_test_main_py_3_1.g.py"), @r###"
# <auto-generated/>
from typing import Callable

import ast
import symtable
from capture import Capture
from capture_interception import intercepts_location
from lib import test

@intercepts_location("main.py", line=3, column=1)
def test__intercepted_main_py_3_1(insp: Callable[[int], int]) -> None:
    intercepted_insp_source = """from typing import Callable

intercepted_insp_lambda = (lambda x: 3 * x)
"""
    intercepted_insp_tree = ast.parse(intercepted_insp_source)
    intercepted_insp_expression, = [node.value for node in intercepted_insp_tree.body if isinstance(node, ast.Assign) and any(isinstance(target, ast.Name) and target.id == "intercepted_insp_lambda" for target in node.targets)]
    intercepted_insp_semantic_model = symtable.symtable(intercepted_insp_source, "<capture>", "exec")
    intercepted_insp = Capture(insp, intercepted_insp_expression, intercepted_insp_semantic_model)
    test(intercepted_insp)
"###);
}

#[test]
fn support_artifact_defines_registry() {
    let output = generate(&[("lib.py", LIB), ("main.py", MAIN)]);
    let support = text(&output, "capture_interception.g.py");
    assert!(support.starts_with("# <auto-generated/>\n"));
    assert!(support.contains("def intercepts_location(file_path, line, column):"));
    assert!(support.contains("def interceptors_for(file_path, line, column):"));
}

#[test]
fn no_call_sites_means_no_support_artifact() {
    let output = generate(&[("lib.py", LIB)]);
    assert_eq!(names(&output.artifacts), vec!["lib_test_Overload.g.py"]);
}

#[test]
fn declaration_without_captures_yields_nothing() {
    let lib = "from typing import Callable\n\ndef test(f: Callable[[int], int]) -> None:\n    pass\n";
    let output = generate(&[("lib.py", lib), ("main.py", MAIN)]);
    assert!(output.artifacts.is_empty());
    assert!(output.declarations.is_empty());
    assert!(output.call_sites.is_empty());
}

#[test]
fn output_is_deterministic() {
    let first = generate(&[("lib.py", LIB), ("main.py", MAIN)]);
    let again = generate(&[("main.py", MAIN), ("lib.py", LIB)]);
    assert_eq!(first.artifacts, again.artifacts);
}

#[test]
fn capture_text_is_escaped() {
    let main = "from lib import test\n\ntest(lambda s: s + \"\\n\")\n";
    let output = generate(&[("lib.py", LIB), ("main.py", main)]);
    let interceptor = text(&output, "Intercepted_test_main_py_3_1.g.py");
    assert!(interceptor.contains(r#"intercepted_insp_lambda = (lambda s: s + \"\\n\")"#));
}

#[test]
fn calls_in_nested_positions_are_found() {
    let main = "\
import lib

def outer():
    return [lib.test(lambda x: x) for _ in range(2)]

print(lib.test(lambda y: y + 1))
";
    let output = generate(&[("lib.py", LIB), ("main.py", main)]);
    let sites: Vec<_> = output.call_sites.iter().map(|s| s.id.to_string()).collect();
    assert_eq!(sites, vec!["main.py:4:13", "main.py:6:7"]);
}

#[test]
fn unalignable_and_unresolved_calls_are_dropped_quietly() {
    let main = "\
from lib import test

fs = []
test(*fs)
test(insp=lambda x: x, extra=1)
unknown(lambda x: x)
test(lambda x: x)
";
    let output = generate(&[("lib.py", LIB), ("main.py", main)]);
    assert!(output.diagnostics.is_empty());
    let sites: Vec<_> = output.call_sites.iter().map(|s| s.id.line).collect();
    assert_eq!(sites, vec![7]);
}

const SERVICE: &str = "\
from capture import Capture


class Service:
    async def run(self, f: Capture[Fn], n: int = 1) -> int:
        return n

    @classmethod
    def build(cls, f: Capture[Fn]):
        return cls()

    @staticmethod
    def helper(f: Capture[Fn], /, *, flag=False) -> None:
        pass

    async def go(self):
        await self.run(lambda: 1)
        Service.helper(lambda: 2, flag=True)
        type(self).build(lambda: 3)
        Service.build(lambda: 4)
";

#[test]
fn methods_keep_async_and_receivers() {
    let output = generate(&[("lib.py", SERVICE)]);
    let sites: Vec<_> = output.call_sites.iter().map(|s| s.id.to_string()).collect();
    assert_eq!(sites, vec!["lib.py:17:15", "lib.py:18:9", "lib.py:20:9"]);

    let run = text(&output, "Intercepted_run_lib_py_17_15.g.py");
    assert!(run.contains(
        "class Service:\n    @intercepts_location(\"lib.py\", line=17, column=15)\n    async def run__intercepted_lib_py_17_15(self, f: Fn, n: int = 1) -> int:\n"
    ));
    assert!(run.contains("        intercepted_n = n\n"));
    assert!(!run.contains("intercepted_self"));
    assert!(run.contains("        return await self.run(intercepted_f, intercepted_n)\n"));

    let helper = text(&output, "Intercepted_helper_lib_py_18_9.g.py");
    assert!(helper.contains(
        "    @staticmethod\n    @intercepts_location(\"lib.py\", line=18, column=9)\n    def helper__intercepted_lib_py_18_9(f: Fn, /, *, flag=False) -> None:\n"
    ));
    assert!(helper.contains("from lib import Service as original_Service\n"));
    assert!(helper.contains(
        "        original_Service.helper(intercepted_f, flag=intercepted_flag)\n"
    ));

    let build = text(&output, "Intercepted_build_lib_py_20_9.g.py");
    assert!(build.contains("    @classmethod\n    @intercepts_location("));
    assert!(build.contains("        return cls.build(intercepted_f)\n"));

    let stand_in = text(&output, "lib_Service_run_Overload.g.py");
    assert!(stand_in.contains("    async def run(self, f: Fn, n: int = 1) -> int:\n"));
    assert!(stand_in.contains("        return 0\n"));
    let stand_in = text(&output, "lib_Service_helper_Overload.g.py");
    assert!(stand_in.contains("    @staticmethod\n    def helper(f: Fn, /, *, flag=False) -> None:\n"));
}

const CONDITIONAL: &str = "\
import sys
from capture import Capture

if sys.platform == \"win32\":
    def run(f: Capture[Fn]):
        pass
else:
    def run(f: Capture[Fn], /):
        pass
";

#[test]
fn ambiguous_callee_takes_first_candidate_by_default() {
    let main = "from lib import run\n\nrun(lambda: 1)\n";
    let output = generate(&[("lib.py", CONDITIONAL), ("main.py", main)]);
    assert_eq!(output.call_sites.len(), 1);
    assert_eq!(output.declaration_of(&output.call_sites[0]).id.signature, "f: Capture[Fn]");

    let overloads: Vec<_> = output
        .artifacts
        .iter()
        .filter(|a| a.kind == ArtifactKind::Overload)
        .map(|a| a.name.clone())
        .collect();
    let suffix = identity_hash(&output.declarations[1].id.to_string());
    assert_eq!(
        overloads,
        vec![
            "lib_run_Overload.g.py".to_string(),
            format!("lib_run_Overload_{suffix}.g.py"),
        ]
    );
}

#[test]
fn ambiguous_callee_is_reported_under_error_policy() {
    let main = "from lib import run\n\nrun(lambda: 1)\n";
    let options = GeneratorOptions {
        ambiguity: AmbiguityPolicy::Error,
        ..GeneratorOptions::default()
    };
    let output = generate_with(&[("lib.py", CONDITIONAL), ("main.py", main)], options);
    assert!(output.call_sites.is_empty());
    assert!(!output.artifacts.iter().any(|a| a.kind == ArtifactKind::Interceptor));
    match &output.diagnostics[..] {
        [GeneratorDiagnostic::AmbiguousCallee { callee, candidates, .. }] => {
            assert_eq!(callee, "run");
            assert_eq!(candidates, &["lib.run", "lib.run"]);
        }
        other => panic!("unexpected diagnostics: {other:?}"),
    }
}

#[test]
fn parse_failure_does_not_stop_generation() {
    let output = generate(&[("lib.py", LIB), ("main.py", MAIN), ("broken.py", "def (:\n")]);
    assert_eq!(output.call_sites.len(), 2);
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.diagnostics[0].diagnostic_code(), "C001");
}

#[test]
fn custom_marker_and_support_module() {
    let lib = "from inspect_tree import Inspect\n\ndef test(f: Inspect[Fn]):\n    pass\n";
    let main = "from lib import test\n\ntest(lambda: 1)\n";
    let options = GeneratorOptions {
        marker: capgen_generator::model::MarkerSpec::new("Inspect", "inspect_tree"),
        support_module: "interception".to_string(),
        ..GeneratorOptions::default()
    };
    let output = generate_with(&[("lib.py", lib), ("main.py", main)], options);
    assert!(output.artifact("interception.g.py").is_some());

    let interceptor = text(&output, "Intercepted_test_main_py_3_1.g.py");
    assert!(interceptor.contains("from inspect_tree import Inspect\n"));
    assert!(interceptor.contains("from interception import intercepts_location\n"));
    assert!(interceptor.contains("from lib import test\n"));
    assert!(interceptor.contains("intercepted_f = Inspect(f, "));
    assert!(interceptor.contains("return test(intercepted_f)\n"));
}

#[test]
fn nested_static_method_forwards_through_aliased_top_level_class() {
    let lib = "\
from capture import Capture

class Outer:
    class Inner:
        @staticmethod
        def make(f: Capture[Fn]) -> int:
            return 0
";
    let main = "from lib import Outer\n\nOuter.Inner.make(lambda: 1)\n";
    let output = generate(&[("lib.py", lib), ("main.py", main)]);
    let interceptor = text(&output, "Intercepted_make_main_py_3_1.g.py");
    assert!(interceptor.contains("from lib import Outer as original_Outer\n"));
    assert!(interceptor.contains("class Outer:\n    class Inner:\n"));
    assert!(interceptor.contains("            return original_Outer.Inner.make(intercepted_f)\n"));
}

#[test]
fn guarded_imports_stay_out_of_artifacts() {
    let lib = "\
from typing import TYPE_CHECKING

from capture import Capture

if TYPE_CHECKING:
    from nonexistent_pkg import Thing

try:
    import ujson as json
except ImportError:
    import json

def test(f: Capture[Fn]) -> None:
    pass
";
    let main = "from lib import test\n\ntest(lambda: Thing)\n";
    let output = generate(&[("lib.py", lib), ("main.py", main)]);

    for artifact in ["lib_test_Overload.g.py", "Intercepted_test_main_py_3_1.g.py"] {
        let text = text(&output, artifact);
        assert!(text.contains("from typing import TYPE_CHECKING\n"), "{artifact}");
        assert!(!text.contains("nonexistent_pkg"), "{artifact}");
        assert!(!text.contains("json"), "{artifact}");
    }

    match &output.diagnostics[..] {
        [GeneratorDiagnostic::OuterCapture { names, .. }] => assert_eq!(names, &["Thing"]),
        other => panic!("unexpected diagnostics: {other:?}"),
    }
}

#[test]
fn declaration_lookup_falls_back_to_first_same_name_in_program() {
    let a = "def f(g):\n    pass\n";
    let b = "from capture import Capture\n\ndef f(g: Capture[Fn]):\n    pass\n";
    let main = "from a import f\n\nf(lambda: 1)\n";
    let output = generate(&[("a.py", a), ("b.py", b), ("main.py", main)]);

    assert_eq!(output.call_sites.len(), 1);
    let declaration = output.declaration_of(&output.call_sites[0]);
    assert_eq!(declaration.id.qualified_name(), "b.f");
    assert!(text(&output, "Intercepted_f_main_py_3_1.g.py").contains("from b import f\n"));
}

#[test]
fn location_path_is_escaped() {
    let main = "from lib import test\n\ntest(lambda x: x)\n";
    let output = generate(&[("lib.py", LIB), ("we\"ird\\main.py", main)]);
    let interceptor = output
        .artifacts
        .iter()
        .find(|a| a.kind == ArtifactKind::Interceptor)
        .unwrap();
    assert!(interceptor
        .text
        .contains(r#"@intercepts_location("we\"ird\\main.py", line=3, column=1)"#));
}
