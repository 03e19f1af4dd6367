// Copyright 2024 The Multiplex Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::env;
use std::fs;
use std::path::Path;

use protobuf_codegen_pure::Codegen;

fn main() {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo for every build script");

    Codegen::new()
        .out_dir(&out_dir)
        .inputs(&["src/proto/schema/envelope.proto", "src/proto/schema/counter.proto"])
        .include("src/proto/schema")
        .run()
        .expect("protobuf codegen failed; schema files live in src/proto/schema");

    // Each generated file carries its own `#![allow(...)]` inner attributes,
    // which are only permitted by rustc at the start of a file parsed on its
    // own (not when spliced in via `include!`). Emit a small wrapper that
    // brings each generated file in as its own module via `#[path]`, which
    // rustc treats as an independent file parse.
    let mod_rs = r#"#[path = "envelope.rs"]
mod envelope_gen;
#[path = "counter.rs"]
mod counter_gen;
"#;
    fs::write(Path::new(&out_dir).join("proto_gen_mod.rs"), mod_rs)
        .expect("failed to write proto_gen_mod.rs into OUT_DIR");

    println!("cargo:rerun-if-changed=src/proto/schema/envelope.proto");
    println!("cargo:rerun-if-changed=src/proto/schema/counter.proto");
}
