use medialog::{
    command::{ALL_COMMANDS, ArgKind, CommandId},
    types::MediaKind,
};

#[test]
fn every_name_resolves_back_to_its_command() {
    for &command in ALL_COMMANDS {
        assert_eq!(CommandId::from_name(command.name()), Some(command));
        assert_eq!(command.to_string(), command.name());
        assert_eq!(command.name().parse::<CommandId>().expect("parse"), command);
    }
}

#[test]
fn lookup_is_case_insensitive() {
    assert_eq!(CommandId::from_name("GaussianBlur"), Some(CommandId::GaussianBlur));
    assert_eq!(CommandId::from_name("RELLINETO"), Some(CommandId::RelLineTo));
}

#[test]
fn unknown_names_have_no_command() {
    for name in ["", "blur", "negate ", "crop2", "gaussian_blur"] {
        assert_eq!(CommandId::from_name(name), None, "{name:?}");
        assert!(name.parse::<CommandId>().is_err());
    }
}

#[test]
fn catalog_is_closed_and_split_by_media() {
    assert_eq!(ALL_COMMANDS.len(), 40);
    let vector = ALL_COMMANDS
        .iter()
        .filter(|c| c.media() == MediaKind::Vector)
        .count();
    assert_eq!(vector, 10);
    assert_eq!(CommandId::Stroke.media(), MediaKind::Vector);
    assert_eq!(CommandId::Wave.media(), MediaKind::Raster);
}

#[test]
fn schemas_match_argument_order() {
    assert_eq!(
        CommandId::Crop.schema(),
        &[ArgKind::Uint, ArgKind::Uint, ArgKind::Uint, ArgKind::Uint]
    );
    assert_eq!(CommandId::Rotate.schema(), &[ArgKind::Double, ArgKind::Text]);
    assert_eq!(CommandId::Tint.schema(), &[ArgKind::Text, ArgKind::Double]);
    assert_eq!(CommandId::Roll.schema(), &[ArgKind::Int, ArgKind::Int]);
    assert!(CommandId::Negate.schema().is_empty());
    assert_eq!(CommandId::SetWidth.schema(), &[ArgKind::Uint]);
}
