//! Built-in block schemas of the generated file families.
//!
//! The UUIDs below are part of the generated files and must never change:
//! an existing file is only merged correctly if its markers carry the same
//! ids. New markers get fresh ids from `stencil helpers generate-uuids`.

use std::sync::LazyLock;
use uuid::Uuid;

use crate::domain::entities::block::BlockSchema;

pub const BLOCK_VERSION: &str = "v1";

pub const MODULE_ADD_HEADERS: Uuid = Uuid::from_u128(0x701220c9_0469_43b2_8c2d_c8b6855be781);
pub const MODULE_PUBLIC_DEFS: Uuid = Uuid::from_u128(0xa18196b1_99c0_41fa_bcd7_187782076e00);
pub const MODULE_PROTECTED_DEFS: Uuid = Uuid::from_u128(0x39f26bd7_04f0_4d7e_bc65_b0c424a15c97);
pub const MODULE_PRIVATE_DEFS: Uuid = Uuid::from_u128(0x9c0db851_9d07_420f_900b_0434c0090550);
pub const MODULE_AFTER_CLASS: Uuid = Uuid::from_u128(0x04a71325_5171_4a84_844b_4b23630f4669);

pub const IMPL_ADD_HEADERS: Uuid = Uuid::from_u128(0xda5b84d3_f8f0_433a_ab6d_17ba78dc045d);
pub const IMPL_PUBLIC_DEFS: Uuid = Uuid::from_u128(0xb547220e_d428_4267_8918_d13879d9983c);
pub const IMPL_PROTECTED_DEFS: Uuid = Uuid::from_u128(0xc6f421c7_56b9_46a2_85d6_78443bd7ab21);
pub const IMPL_PRIVATE_DEFS: Uuid = Uuid::from_u128(0x49d415d9_c861_45ab_862c_ede16ce16b3e);
pub const IMPL_AFTER_CLASS: Uuid = Uuid::from_u128(0x450f7b1e_d14d_4774_9d01_f54154482741);

pub const CMAKE_ADD_GENERAL: Uuid = Uuid::from_u128(0x903ef9da_389f_467f_b4ff_f2c40be6c324);
pub const CMAKE_ADD_OTHER: Uuid = Uuid::from_u128(0x848944d4_eca9_4755_8ec6_878874e38a90);

fn class_header_markers(ids: [Uuid; 5]) -> [(&'static str, Uuid, &'static str); 5] {
    [
        ("add_headers", ids[0], "// insert your custom include headers here\n"),
        ("public_defs", ids[1], "// insert your public definitions here\n"),
        ("protected_defs", ids[2], "// insert your protected definitions here\n"),
        ("private_defs", ids[3], "// insert your private definitions here\n"),
        ("after_class", ids[4], "// insert other definitions here\n"),
    ]
}

static MODULE_HEADER: LazyLock<BlockSchema> = LazyLock::new(|| {
    BlockSchema::new(
        "module-header",
        "//",
        BLOCK_VERSION,
        class_header_markers([
            MODULE_ADD_HEADERS,
            MODULE_PUBLIC_DEFS,
            MODULE_PROTECTED_DEFS,
            MODULE_PRIVATE_DEFS,
            MODULE_AFTER_CLASS,
        ]),
    )
    .expect("built-in module header block schema is valid")
});

static IMPL_HEADER: LazyLock<BlockSchema> = LazyLock::new(|| {
    BlockSchema::new(
        "impl-header",
        "//",
        BLOCK_VERSION,
        class_header_markers([
            IMPL_ADD_HEADERS,
            IMPL_PUBLIC_DEFS,
            IMPL_PROTECTED_DEFS,
            IMPL_PRIVATE_DEFS,
            IMPL_AFTER_CLASS,
        ]),
    )
    .expect("built-in implementation header block schema is valid")
});

static CMAKE: LazyLock<BlockSchema> = LazyLock::new(|| {
    BlockSchema::new(
        "cmake",
        "#",
        BLOCK_VERSION,
        [
            (
                "add_general",
                CMAKE_ADD_GENERAL,
                "# insert your custom targets and additional config variables here\n",
            ),
            (
                "add_other",
                CMAKE_ADD_OTHER,
                "# insert other things like install cmds etc here\n",
            ),
        ],
    )
    .expect("built-in cmake block schema is valid")
});

/// Blocks of `modules/<M>/<M>.hpp`.
pub fn module_header() -> &'static BlockSchema {
    &MODULE_HEADER
}

/// Blocks of `modules/<M>/<impl>/<I>Impl.hpp`.
pub fn impl_header() -> &'static BlockSchema {
    &IMPL_HEADER
}

/// Blocks of `modules/<M>/CMakeLists.txt`.
pub fn cmake() -> &'static BlockSchema {
    &CMAKE
}
