// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Predefined mime-type strings used to tag a [`super::Meta::datatype`].

pub const SINGLE_SINT32: &str = "binary/sint32";
pub const SINGLE_SINT64: &str = "binary/sint64";
pub const SINGLE_SFIXED32: &str = "binary/sfixed32";
pub const SINGLE_SFIXED64: &str = "binary/sfixed64";
pub const SINGLE_FLOAT: &str = "binary/float";
pub const SINGLE_DOUBLE: &str = "binary/double";
pub const SINGLE_STRING: &str = "text/string";
pub const BYTES: &str = "binary/bytes";
pub const PLAIN_DATA: &str = "binary/native";
pub const JAVA_OBJECT: &str = "binary/java";
pub const CPP_OBJECT: &str = "binary/cpp";
pub const PYTHON_OBJECT: &str = "binary/python";

pub const ARRAY_SINT32: &str = "binary/array-sint32";
pub const ARRAY_SINT64: &str = "binary/array-sint64";
pub const ARRAY_FLOAT: &str = "binary/array-float";
pub const ARRAY_DOUBLE: &str = "binary/array-double";
pub const ARRAY_STRING: &str = "binary/array-string";

pub const JSON: &str = "application/json";
