//! Shared test helpers for `txtpb_core` integration tests.
//!
//! The descriptor pool is assembled from `prost-types` descriptor protos so
//! the tests need no `protoc` or build script. The schema, in `.proto`
//! terms:
//!
//! ```text
//! // google/protobuf/any.proto (proto3)
//! message Any { string type_url = 1; bytes value = 2; }
//!
//! // txtpb/test.proto (proto2), package txtpb.test
//! enum Color { RED = 0; GREEN = 1; BLUE = 2; }
//! message Inner { optional int32 a = 1; optional string b = 2; repeated int32 r = 3; }
//! message TestMessage {
//!   optional int32 int32_value = 1;    optional int64 int64_value = 2;
//!   optional uint32 uint32_value = 3;  optional uint64 uint64_value = 4;
//!   optional sint32 sint32_value = 5;  optional fixed64 fixed64_value = 6;
//!   optional float float_value = 7;    optional double double_value = 8;
//!   optional bool bool_value = 9;      optional string string_value = 10;
//!   optional bytes bytes_value = 11;   optional Color color = 12;
//!   optional Inner inner = 13;         repeated int32 repeated_int32 = 14;
//!   repeated string repeated_string = 15;
//!   repeated Inner repeated_inner = 16;
//!   map<int32, string> int_map = 17;   map<string, Inner> string_map = 18;
//!   oneof choice { int32 choice_int = 19; string choice_string = 20; }
//!   optional group MyGroup = 21 { optional int32 group_value = 1; }
//!   optional google.protobuf.Any any_value = 23;
//!   repeated Color repeated_color = 24;
//!   extensions 100 to 199;
//! }
//! extend TestMessage {
//!   optional int32 ext_int = 100; optional Inner ext_inner = 101;
//!   repeated string ext_strings = 102;
//! }
//! message Recursive { optional Recursive child = 1; optional int32 value = 2; }
//! message Container { option message_set_wire_format = true; extensions 4 to max; }
//! message SetItem {
//!   optional string text = 1;
//!   extend Container { optional SetItem message_set_extension = 1000; }
//! }
//!
//! // txtpb/open.proto (proto3), package txtpb.open
//! enum Mood { MOOD_UNSPECIFIED = 0; HAPPY = 1; SAD = 2; }
//! message Settings {
//!   string label = 2; int32 count = 1; Mood mood = 3;
//!   repeated int32 values = 4; Settings nested = 5;
//! }
//! ```

#![allow(unreachable_pub, dead_code)]

use std::sync::LazyLock;

use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, FileDescriptorSet, MessageOptions, OneofDescriptorProto,
    descriptor_proto::ExtensionRange,
};
use txtpb_core::prost_reflect::{
    DescriptorPool, DynamicMessage, MessageDescriptor, ReflectMessage, Value,
};
use txtpb_core::{ExtensionRegistry, ParseError, Parser, TypeRegistry};

pub const PACKAGE: &str = "txtpb.test";
pub const OPEN_PACKAGE: &str = "txtpb.open";
pub const ANY_URL_PREFIX: &str = "type.googleapis.com/";

/// Pool built once per test binary via LazyLock.
pub static POOL: LazyLock<DescriptorPool> = LazyLock::new(|| {
    DescriptorPool::from_file_descriptor_set(FileDescriptorSet {
        file: vec![any_file(), test_file(), open_file()],
    })
    .unwrap_or_else(|e| panic!("test descriptors are invalid: {e}"))
});

/// Every message type in the pool.
pub static TYPES: LazyLock<TypeRegistry> =
    LazyLock::new(|| TypeRegistry::builder().add_pool(&POOL).build());

/// Every extension in the pool.
pub static EXTENSIONS: LazyLock<ExtensionRegistry> =
    LazyLock::new(|| ExtensionRegistry::builder().add_pool(&POOL).build());

// ─── Lookup helpers ─────────────────────────────────────────────────────────

/// Message descriptor by short name within the test package.
pub fn message_type(name: &str) -> MessageDescriptor {
    let full = format!("{PACKAGE}.{name}");
    POOL.get_message_by_name(&full)
        .unwrap_or_else(|| panic!("no message {full}"))
}

pub fn test_message() -> MessageDescriptor {
    message_type("TestMessage")
}

/// The proto3 `Settings` message.
pub fn settings() -> MessageDescriptor {
    POOL.get_message_by_name(&format!("{OPEN_PACKAGE}.Settings"))
        .unwrap_or_else(|| panic!("no message {OPEN_PACKAGE}.Settings"))
}

/// Value of a declared field by name.
pub fn get(message: &DynamicMessage, name: &str) -> Value {
    message
        .get_field_by_name(name)
        .unwrap_or_else(|| panic!("no field {name}"))
        .into_owned()
}

pub fn has(message: &DynamicMessage, name: &str) -> bool {
    let field = message
        .descriptor()
        .get_field_by_name(name)
        .unwrap_or_else(|| panic!("no field {name}"));
    message.has_field(&field)
}

/// Value of an extension by full name.
pub fn get_extension(message: &DynamicMessage, full_name: &str) -> Value {
    let extension = POOL
        .get_extension_by_name(full_name)
        .unwrap_or_else(|| panic!("no extension {full_name}"));
    message.get_extension(&extension).into_owned()
}

/// A parser that knows every type and extension in the pool.
pub fn full_parser() -> txtpb_core::ParserBuilder {
    Parser::builder()
        .type_registry(TYPES.clone())
        .extension_registry(EXTENSIONS.clone())
}

/// Parse into a `TestMessage` with the default parser.
pub fn parse_test(text: &str) -> Result<DynamicMessage, ParseError> {
    txtpb_core::parse(text, test_message())
}

// ─── Descriptor builders ────────────────────────────────────────────────────

fn scalar(name: &str, number: i32, label: Label, ty: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(label as i32),
        r#type: Some(ty as i32),
        ..Default::default()
    }
}

fn typed(name: &str, number: i32, label: Label, ty: Type, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        type_name: Some(type_name.to_string()),
        ..scalar(name, number, label, ty)
    }
}

fn extension(field: FieldDescriptorProto, extendee: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        extendee: Some(extendee.to_string()),
        ..field
    }
}

fn message(name: &str, field: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        field,
        ..Default::default()
    }
}

fn map_entry(name: &str, key: Type, value: FieldDescriptorProto) -> DescriptorProto {
    DescriptorProto {
        options: Some(MessageOptions {
            map_entry: Some(true),
            ..Default::default()
        }),
        ..message(name, vec![scalar("key", 1, Label::Optional, key), value])
    }
}

fn any_file() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some("google/protobuf/any.proto".to_string()),
        package: Some("google.protobuf".to_string()),
        message_type: vec![message(
            "Any",
            vec![
                scalar("type_url", 1, Label::Optional, Type::String),
                scalar("value", 2, Label::Optional, Type::Bytes),
            ],
        )],
        syntax: Some("proto3".to_string()),
        ..Default::default()
    }
}

fn test_file() -> FileDescriptorProto {
    let t = |name: &str| format!(".{PACKAGE}.{name}");

    let color = EnumDescriptorProto {
        name: Some("Color".to_string()),
        value: ["RED", "GREEN", "BLUE"]
            .iter()
            .zip(0..)
            .map(|(name, number)| EnumValueDescriptorProto {
                name: Some((*name).to_string()),
                number: Some(number),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    };

    let inner = message(
        "Inner",
        vec![
            scalar("a", 1, Label::Optional, Type::Int32),
            scalar("b", 2, Label::Optional, Type::String),
            scalar("r", 3, Label::Repeated, Type::Int32),
        ],
    );

    let mut test_message = message(
        "TestMessage",
        vec![
            scalar("int32_value", 1, Label::Optional, Type::Int32),
            scalar("int64_value", 2, Label::Optional, Type::Int64),
            scalar("uint32_value", 3, Label::Optional, Type::Uint32),
            scalar("uint64_value", 4, Label::Optional, Type::Uint64),
            scalar("sint32_value", 5, Label::Optional, Type::Sint32),
            scalar("fixed64_value", 6, Label::Optional, Type::Fixed64),
            scalar("float_value", 7, Label::Optional, Type::Float),
            scalar("double_value", 8, Label::Optional, Type::Double),
            scalar("bool_value", 9, Label::Optional, Type::Bool),
            scalar("string_value", 10, Label::Optional, Type::String),
            scalar("bytes_value", 11, Label::Optional, Type::Bytes),
            typed("color", 12, Label::Optional, Type::Enum, &t("Color")),
            typed("inner", 13, Label::Optional, Type::Message, &t("Inner")),
            scalar("repeated_int32", 14, Label::Repeated, Type::Int32),
            scalar("repeated_string", 15, Label::Repeated, Type::String),
            typed("repeated_inner", 16, Label::Repeated, Type::Message, &t("Inner")),
            typed(
                "int_map",
                17,
                Label::Repeated,
                Type::Message,
                &t("TestMessage.IntMapEntry"),
            ),
            typed(
                "string_map",
                18,
                Label::Repeated,
                Type::Message,
                &t("TestMessage.StringMapEntry"),
            ),
            FieldDescriptorProto {
                oneof_index: Some(0),
                ..scalar("choice_int", 19, Label::Optional, Type::Int32)
            },
            FieldDescriptorProto {
                oneof_index: Some(0),
                ..scalar("choice_string", 20, Label::Optional, Type::String)
            },
            typed(
                "mygroup",
                21,
                Label::Optional,
                Type::Group,
                &t("TestMessage.MyGroup"),
            ),
            typed(
                "any_value",
                23,
                Label::Optional,
                Type::Message,
                ".google.protobuf.Any",
            ),
            typed("repeated_color", 24, Label::Repeated, Type::Enum, &t("Color")),
        ],
    );
    test_message.nested_type = vec![
        map_entry(
            "IntMapEntry",
            Type::Int32,
            scalar("value", 2, Label::Optional, Type::String),
        ),
        map_entry(
            "StringMapEntry",
            Type::String,
            typed("value", 2, Label::Optional, Type::Message, &t("Inner")),
        ),
        message(
            "MyGroup",
            vec![scalar("group_value", 1, Label::Optional, Type::Int32)],
        ),
    ];
    test_message.oneof_decl = vec![OneofDescriptorProto {
        name: Some("choice".to_string()),
        ..Default::default()
    }];
    test_message.extension_range = vec![ExtensionRange {
        start: Some(100),
        end: Some(200),
        ..Default::default()
    }];

    let recursive = message(
        "Recursive",
        vec![
            typed("child", 1, Label::Optional, Type::Message, &t("Recursive")),
            scalar("value", 2, Label::Optional, Type::Int32),
        ],
    );

    let container = DescriptorProto {
        options: Some(MessageOptions {
            message_set_wire_format: Some(true),
            ..Default::default()
        }),
        extension_range: vec![ExtensionRange {
            start: Some(4),
            end: Some(536_870_912),
            ..Default::default()
        }],
        ..message("Container", vec![])
    };

    let set_item = DescriptorProto {
        extension: vec![extension(
            typed(
                "message_set_extension",
                1000,
                Label::Optional,
                Type::Message,
                &t("SetItem"),
            ),
            &t("Container"),
        )],
        ..message(
            "SetItem",
            vec![scalar("text", 1, Label::Optional, Type::String)],
        )
    };

    FileDescriptorProto {
        name: Some("txtpb/test.proto".to_string()),
        package: Some(PACKAGE.to_string()),
        dependency: vec!["google/protobuf/any.proto".to_string()],
        message_type: vec![inner, test_message, recursive, container, set_item],
        enum_type: vec![color],
        extension: vec![
            extension(
                scalar("ext_int", 100, Label::Optional, Type::Int32),
                &t("TestMessage"),
            ),
            extension(
                typed("ext_inner", 101, Label::Optional, Type::Message, &t("Inner")),
                &t("TestMessage"),
            ),
            extension(
                scalar("ext_strings", 102, Label::Repeated, Type::String),
                &t("TestMessage"),
            ),
        ],
        syntax: Some("proto2".to_string()),
        ..Default::default()
    }
}

fn open_file() -> FileDescriptorProto {
    let t = |name: &str| format!(".{OPEN_PACKAGE}.{name}");

    let mood = EnumDescriptorProto {
        name: Some("Mood".to_string()),
        value: ["MOOD_UNSPECIFIED", "HAPPY", "SAD"]
            .iter()
            .zip(0..)
            .map(|(name, number)| EnumValueDescriptorProto {
                name: Some((*name).to_string()),
                number: Some(number),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    };

    // Declaration order differs from field-number order.
    let settings = message(
        "Settings",
        vec![
            scalar("label", 2, Label::Optional, Type::String),
            scalar("count", 1, Label::Optional, Type::Int32),
            typed("mood", 3, Label::Optional, Type::Enum, &t("Mood")),
            scalar("values", 4, Label::Repeated, Type::Int32),
            typed("nested", 5, Label::Optional, Type::Message, &t("Settings")),
        ],
    );

    FileDescriptorProto {
        name: Some("txtpb/open.proto".to_string()),
        package: Some(OPEN_PACKAGE.to_string()),
        message_type: vec![settings],
        enum_type: vec![mood],
        syntax: Some("proto3".to_string()),
        ..Default::default()
    }
}
