// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

fn main() {
    prost_build::Config::new()
        .compile_protos(
            &["proto/meta.proto", "proto/registration.proto", "proto/data.proto"],
            &["proto/"],
        )
        .expect("failed to compile clara-msg protobuf schema");
}
