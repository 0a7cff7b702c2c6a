use dom_schema::{Binding, ChildCountRule, SchemaRegistry};

use super::enums::{FxOpaqueEnum, MorphMethodType, NodeType, UpAxisType, VersionType};
use super::*;

#[test]
fn every_handle_resolves() {
    let (collection, schema) = initialize().unwrap();
    schema.verify(&collection).unwrap();

    let bindings = schema.bindings();
    assert!(bindings.contains(&Binding::RootElement {
        namespace: NS,
        name: "COLLADA",
        id: schema.collada_root_element,
    }));
    assert!(bindings.contains(&Binding::Child {
        node_type: schema.geometry.ty,
        name: "mesh",
        id: schema.geometry.mesh_child,
    }));
    assert_eq!(
        ColladaSchema::initialize(&collection).unwrap(),
        schema,
        "binding twice yields the same handles"
    );
}

#[test]
fn handles_match_lookups() {
    let (collection, schema) = initialize().unwrap();

    let geometry = collection.get_node_type_local("geometry").unwrap();
    assert_eq!(schema.geometry.ty, geometry.id());
    assert_eq!(schema.geometry.id_attribute, geometry.attribute_id("id").unwrap());
    let mesh = collection.child_info(schema.geometry.mesh_child).unwrap();
    assert_eq!(mesh.node_type(), schema.mesh.ty);
    assert!(!mesh.is_list());

    let collada = collection
        .root_element(schema.collada_root_element)
        .unwrap();
    assert_eq!(collada.node_type(), schema.collada.ty);
    let scene = collection.child_info(schema.collada.scene_child).unwrap();
    assert_eq!(scene.node_type(), schema.collada_scene.ty);
    assert_eq!(
        collection
            .node_type(schema.collada_scene.ty)
            .unwrap()
            .name()
            .local_name,
        "COLLADA_scene"
    );

    let source = collection.child_info(schema.skin.source_child).unwrap();
    assert_eq!(source.node_type(), schema.source.ty);
    assert_eq!(
        source.count_rule(),
        Some(ChildCountRule { min: 1, max: None })
    );
    let attribute = collection
        .attribute_info(schema.skin.source_attribute)
        .unwrap();
    assert_eq!(attribute.name(), "source");
}

#[test]
fn simple_elements_become_attributes() {
    let (collection, schema) = initialize().unwrap();

    let up_axis = collection
        .attribute_info(schema.asset.up_axis_attribute)
        .unwrap();
    assert!(up_axis.is_element());
    assert_eq!(up_axis.default_value(), Some("Y_UP"));
    assert!(collection
        .attribute_info(schema.asset.created_attribute)
        .unwrap()
        .is_element());

    let node_type = collection.attribute_info(schema.node.type_attribute).unwrap();
    assert!(!node_type.is_element());
    assert_eq!(node_type.default_value(), Some("NODE"));

    let value = collection
        .attribute_info(schema.float_array.value_attribute)
        .unwrap();
    assert!(value.is_value_attribute());
}

#[test]
fn inherited_handles_keep_their_slot() {
    let (collection, schema) = initialize().unwrap();
    let base = &schema.common_color_or_texture_type;
    let transparent = &schema.common_transparent_type;

    // An extension restates the base content, so the derived type owns its own handle
    assert_ne!(transparent.color_child, base.color_child);
    assert_eq!(transparent.color_child.index(), base.color_child.index());
    assert_eq!(transparent.texture_child.index(), base.texture_child.index());
    let color = collection.child_info(transparent.color_child).unwrap();
    assert_eq!(color.owning_type(), transparent.ty);
    assert_eq!(color.defining_type(), base.ty);
    let base_color = collection.child_info(base.color_child).unwrap();
    assert_eq!(base_color.owning_type(), base.ty);
    assert_eq!(base_color.defining_type(), base.ty);
    assert!(collection.is_assignable(base.ty, transparent.ty));

    let opaque = collection
        .attribute_info(transparent.opaque_attribute)
        .unwrap();
    assert_eq!(opaque.defining_type(), transparent.ty);
    assert_eq!(opaque.owning_type(), transparent.ty);
    assert_eq!(opaque.default_value(), Some("A_ONE"));
}

#[test]
fn profiles_substitute_the_abstract_profile() {
    let (collection, schema) = initialize().unwrap();
    let profiles = collection
        .child_info(schema.effect.fx_profile_abstract_child)
        .unwrap();
    let substitutions = profiles.substitutions();
    assert_eq!(substitutions.len(), 4);
    for profile in [
        schema.profile_common_root_element,
        schema.profile_glsl_root_element,
        schema.profile_cg_root_element,
        schema.profile_gles_root_element,
    ] {
        assert!(substitutions.contains(&profile));
    }

    let profile_common = collection
        .root_element(schema.profile_common_root_element)
        .unwrap();
    assert_eq!(profile_common.node_type(), schema.profile_common.ty);
    let profile_cg = collection
        .root_element(schema.profile_cg_root_element)
        .unwrap();
    assert_eq!(profile_cg.node_type(), schema.profile_cg.ty);
    assert_eq!(profile_cg.name().local_name, "profile_CG");

    let platform = collection
        .attribute_info(schema.profile_cg.platform_attribute)
        .unwrap();
    assert_eq!(platform.default_value(), Some("PC-OGL"));
    let platform = collection
        .attribute_info(schema.profile_gles.platform_attribute)
        .unwrap();
    assert_eq!(platform.default_value(), Some("PC"));
    assert!(collection
        .node_type(schema.profile_glsl.ty)
        .unwrap()
        .get_attribute("platform")
        .is_none());
}

#[test]
fn cg_parameters_and_surfaces() {
    let (collection, schema) = initialize().unwrap();
    let newparam = &schema.cg_newparam;

    let surface = collection.child_info(newparam.surface_child).unwrap();
    assert_eq!(surface.node_type(), schema.cg_surface_type.ty);
    let sampler = collection
        .node_type(newparam.ty)
        .unwrap()
        .get_child("sampler2D")
        .unwrap();
    let cg_sampler = collection.get_node_type_local("cg_sampler2D").unwrap();
    let fx_sampler = collection.get_node_type_local("fx_sampler2D_common").unwrap();
    assert_eq!(sampler.node_type(), cg_sampler.id());
    assert!(collection.is_assignable(fx_sampler.id(), cg_sampler.id()));

    let semantic = collection
        .attribute_info(newparam.semantic_attribute)
        .unwrap();
    assert!(semantic.is_element());
    let sid = collection.attribute_info(newparam.sid_attribute).unwrap();
    assert!(!sid.is_element());
    // Scalar parameter types are simple, so they bind as element attributes
    assert!(collection
        .node_type(newparam.ty)
        .unwrap()
        .get_attribute("float4x4")
        .unwrap()
        .is_element());

    let init_from = collection
        .child_info(schema.cg_surface_type.init_from_child)
        .unwrap();
    assert_eq!(init_from.node_type(), schema.fx_surface_init_from_common.ty);
    assert!(init_from.is_list());
    assert_eq!(init_from.defining_type(), schema.fx_surface_common.ty);
    assert_eq!(init_from.owning_type(), schema.cg_surface_type.ty);
    assert_eq!(
        schema.cg_surface_type.init_from_child.index(),
        schema.fx_surface_common.init_from_child.index()
    );
    assert!(collection.is_assignable(schema.fx_surface_common.ty, schema.cg_surface_type.ty));

    let image = collection
        .attribute_info(schema.fx_surface_init_from_common.value_attribute)
        .unwrap();
    assert!(image.is_value_attribute());
    let face = collection
        .attribute_info(schema.fx_surface_init_from_common.face_attribute)
        .unwrap();
    assert_eq!(face.default_value(), Some("POSITIVE_X"));

    let source = fx_sampler.get_attribute("source").unwrap();
    assert!(source.is_element());
    assert_eq!(
        cg_sampler.attribute_id("source").unwrap().index(),
        source.index()
    );
}

#[test]
fn shader_profiles_keep_their_own_passes() {
    let (collection, schema) = initialize().unwrap();
    let pass_of = |technique_child| {
        let technique = collection.child_info(technique_child).unwrap();
        let technique = collection.node_type(technique.node_type()).unwrap();
        technique.get_child("pass").unwrap().node_type()
    };

    let glsl_pass = pass_of(schema.profile_glsl.technique_child);
    let cg_pass = pass_of(schema.profile_cg.technique_child);
    let gles_pass = pass_of(schema.profile_gles.technique_child);
    assert_ne!(glsl_pass, cg_pass);
    assert_ne!(cg_pass, gles_pass);

    let cg_pass = collection.node_type(cg_pass).unwrap();
    let shader = collection.node_type(cg_pass.get_child("shader").unwrap().node_type()).unwrap();
    let stage = shader.get_attribute("stage").unwrap();
    let stage = collection.attribute_type(stage.attribute_type()).unwrap();
    assert_eq!(stage.name().unwrap().local_name, "cg_pipeline_stage");
    assert!(shader.get_child("bind").unwrap().is_list());

    // Render states declared inline under the same name share one node type
    let glsl_pass = collection.node_type(glsl_pass).unwrap();
    let gles_pass = collection.node_type(gles_pass).unwrap();
    let alpha_func = glsl_pass.get_child("alpha_func").unwrap().node_type();
    assert_eq!(gles_pass.get_child("alpha_func").unwrap().node_type(), alpha_func);
    assert_eq!(
        collection.node_type(alpha_func).unwrap().name().local_name,
        "alpha_func"
    );
    let light_enable = collection
        .node_type(glsl_pass.get_child("light_enable").unwrap().node_type())
        .unwrap();
    for attribute in ["value", "param", "index"] {
        assert!(light_enable.get_attribute(attribute).is_some());
    }
}

#[test]
fn physics_bindings() {
    let (collection, schema) = initialize().unwrap();

    let technique_common = collection
        .child_info(schema.rigid_body.technique_common_child)
        .unwrap();
    let technique_common = collection
        .node_type(technique_common.node_type())
        .unwrap();
    assert_eq!(
        technique_common.name().local_name,
        "rigid_body_technique_common"
    );
    let shape = technique_common.get_child("shape").unwrap();
    assert!(shape.is_list());
    assert_eq!(shape.count_rule(), Some(ChildCountRule { min: 1, max: None }));
    let shape = collection.node_type(shape.node_type()).unwrap();
    assert_eq!(shape.get_child("box").unwrap().node_type(), schema.r#box.ty);
    assert_eq!(
        shape.get_child("sphere").unwrap().node_type(),
        schema.sphere.ty
    );
    assert!(collection
        .attribute_info(schema.r#box.half_extents_attribute)
        .unwrap()
        .is_element());
    assert!(collection
        .attribute_info(schema.rigid_body.sid_attribute)
        .is_some());

    let rigid_body = collection
        .child_info(schema.physics_model.rigid_body_child)
        .unwrap();
    assert_eq!(rigid_body.node_type(), schema.rigid_body.ty);
    assert!(rigid_body.is_list());
    let constraint = collection
        .child_info(schema.physics_model.rigid_constraint_child)
        .unwrap();
    assert_eq!(constraint.node_type(), schema.rigid_constraint.ty);

    let models = collection
        .child_info(schema.library_physics_models.physics_model_child)
        .unwrap();
    assert_eq!(models.node_type(), schema.physics_model.ty);
    let libraries = collection
        .node_type(schema.collada.ty)
        .unwrap()
        .get_child("library_physics_scenes")
        .unwrap();
    assert_eq!(libraries.node_type(), schema.library_physics_scenes.ty);
}

#[test]
fn per_namespace_collections_bind_the_same_handles() {
    let (collection, schema) = initialize().unwrap();
    let collections = load().unwrap().into_collections();
    assert!(collections.contains_key(dom_schema::XML_NAMESPACE));

    let bound = ColladaSchema::initialize_with_collections(&collections).unwrap();
    assert_eq!(bound, schema);
    bound.verify(&collection).unwrap();
}

#[test]
fn enumerations() {
    assert_eq!("Y_UP".parse::<UpAxisType>().unwrap(), UpAxisType::YUp);
    assert_eq!(UpAxisType::ZUp.as_str(), "Z_UP");
    assert_eq!(UpAxisType::VALUES.len(), 3);
    assert_eq!(VersionType::_141.to_string(), "1.4.1");
    assert_eq!(
        "RELATIVE".parse::<MorphMethodType>().unwrap(),
        MorphMethodType::Relative
    );
    assert_eq!("JOINT".parse::<NodeType>().unwrap(), NodeType::Joint);
    assert_eq!(FxOpaqueEnum::RgbZero.as_str(), "RGB_ZERO");

    let err = "W_UP".parse::<UpAxisType>().unwrap_err();
    assert!(matches!(
        err,
        DomError::ValueNotInEnumeration { type_name: "UpAxisType", ref value } if value == "W_UP"
    ));
}

#[test]
fn registry_is_shareable() {
    fn assert_send_sync<T: Send + Sync + 'static>() {}
    assert_send_sync::<ColladaSchema>();
}
