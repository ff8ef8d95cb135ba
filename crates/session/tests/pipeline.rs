use approx::assert_abs_diff_eq;
use compute::aggregate::AggregateValue;
use compute::policy::Policy;
use compute::report::{RecommendationRow, RecommendationTable};
use foundation::ids::LayerId;
use foundation::value::{PropertyValue, properties};
use layers::layer::{LayerDescriptor, LayerKind};
use layers::selection::DrawEvent;
use pretty_assertions::assert_eq;
use runtime::event_bus::EventKind;
use scene::{Feature, Geometry};
use session::{Command, Controller, EngineConfig};

fn cell(name: &str, x0: f64, pairs: Vec<(&str, PropertyValue)>) -> Feature {
    let mut props = properties([("name", PropertyValue::from(name))]);
    props.extend(pairs.into_iter().map(|(k, v)| (k.to_string(), v)));
    Feature::new(Geometry::rectangle([x0, 0.0], [x0 + 1.0, 1.0]), props)
}

fn base_layer() -> LayerDescriptor {
    LayerDescriptor::new("base", "Irradiação", LayerKind::Choropleth, vec![
        cell("A", 0.0, vec![("ANNUAL", 5.2.into()), ("JAN", 6.0.into())]),
        cell("B", 2.0, vec![("ANNUAL", 5.8.into()), ("JAN", 6.4.into())]),
    ])
}

fn milho_layer() -> LayerDescriptor {
    LayerDescriptor::new("milho", "Produção de Milho", LayerKind::Choropleth, vec![
        cell("CityA", 0.0, vec![("milho", 10.0.into())]),
        cell("CityB", 2.0, vec![("milho", 25.0.into())]),
    ])
}

fn controller() -> Controller {
    let config = EngineConfig::from_json_str(r#"{"layers": {"base_layer_id": "base"}}"#).unwrap();
    let mut c = Controller::new(config);
    c.apply(Command::Load(vec![
        base_layer(),
        milho_layer(),
        LayerDescriptor::new("csv-layer", "Dados CSV", LayerKind::Choropleth, vec![]),
        LayerDescriptor::new("coops", "Cooperativas", LayerKind::Point, vec![Feature::new(
            Geometry::Point([0.5, 0.5]),
            properties([("Nome", PropertyValue::from("Coop Norte"))]),
        )]),
    ]));
    c
}

fn draw(min: [f64; 2], max: [f64; 2]) -> Command {
    Command::Draw(DrawEvent::new(Geometry::rectangle(min, max)))
}

fn ids<'a>(it: impl Iterator<Item = &'a LayerId>) -> Vec<&'a str> {
    it.map(LayerId::as_str).collect()
}

#[test]
fn draw_over_one_polygon_keeps_raw_values() {
    let mut c = controller();
    let s = c.apply(draw([0.2, 0.2], [0.8, 0.8]));

    assert_eq!(ids(s.selection.layer_ids()), vec!["base", "milho", "coops"]);
    let base = s.selection.get(&LayerId::new("base")).unwrap();
    assert_eq!(base.len(), 1);
    assert_eq!(base[0].property("name"), Some(&PropertyValue::from("A")));

    let record = s.aggregates.record(&LayerId::new("base")).unwrap();
    assert_eq!(record.policy, Policy::Mean);
    assert_eq!(record.get("ANNUAL"), Some(&AggregateValue::Number(5.2)));
}

#[test]
fn draw_over_both_polygons_averages() {
    let mut c = controller();
    let s = c.apply(draw([-1.0, -1.0], [4.0, 2.0]));
    let record = s.aggregates.record(&LayerId::new("base")).unwrap();
    assert_eq!(record.count, 2);
    assert_abs_diff_eq!(record.number("ANNUAL").unwrap(), 5.5, epsilon = 1e-9);
}

#[test]
fn production_layer_reports_max_with_location() {
    let mut c = controller();
    let s = c.apply(draw([-1.0, -1.0], [4.0, 2.0]));
    let record = s.aggregates.record(&LayerId::new("milho")).unwrap();
    assert_eq!(record.policy, Policy::Max);
    assert_eq!(
        record.get("milho"),
        Some(&AggregateValue::Max {
            value: 25.0,
            location: "CityB".into()
        })
    );
}

#[test]
fn empty_drawing_yields_empty_selection() {
    let mut c = controller();
    c.apply(draw([0.2, 0.2], [0.8, 0.8]));
    let s = c.apply(Command::Draw(DrawEvent::new(Geometry::Polygon(vec![]))));

    assert!(s.selection.is_empty());
    assert!(s.aggregates.is_empty());
    assert!(s.report.charts.is_empty());
    assert_eq!(c.metrics().counter("selection.invalid_input"), 1);

    let decoded: DrawEvent =
        serde_json::from_str(r#"{"geometry":{"type":"Polygon","coordinates":[]}}"#).unwrap();
    let s = c.apply(Command::Draw(decoded));
    assert!(s.selection.is_empty());
}

#[test]
fn csv_layer_on_hides_base() {
    let mut c = controller();
    assert!(c.state().registry.get(&LayerId::new("base")).unwrap().visible);

    let s = c.apply(Command::toggle("csv-layer"));
    assert!(!s.registry.get(&LayerId::new("base")).unwrap().visible);
    assert!(s.registry.get(&LayerId::new("csv-layer")).unwrap().visible);
    assert_eq!(s.registry.visible_choropleth_count(), 1);
}

#[test]
fn selection_never_holds_empty_layers() {
    let mut c = controller();
    let drawings = [
        ([0.2, 0.2], [0.8, 0.8]),
        ([1.2, 0.2], [1.8, 0.8]),
        ([2.5, 0.5], [9.0, 9.0]),
        ([-5.0, -5.0], [-4.0, -4.0]),
    ];
    for (min, max) in drawings {
        let s = c.apply(draw(min, max));
        assert!(s.selection.iter().all(|(_, features)| !features.is_empty()));
    }
}

#[test]
fn recompute_order_is_fixed() {
    let mut c = controller();
    assert_eq!(
        c.events().kinds_for(c.state().cycle),
        vec![
            EventKind::Load,
            EventKind::Visibility,
            EventKind::Attribute,
            EventKind::Domain,
            EventKind::Selection,
            EventKind::Aggregation,
            EventKind::Report,
        ]
    );

    let s = c.apply(Command::toggle("milho"));
    assert_eq!(
        c.events().kinds_for(s.cycle),
        vec![EventKind::Visibility, EventKind::Attribute, EventKind::Domain]
    );

    let s = c.apply(draw([0.0, 0.0], [1.0, 1.0]));
    assert_eq!(
        c.events().kinds_for(s.cycle),
        vec![EventKind::Selection, EventKind::Aggregation, EventKind::Report]
    );

    let s = c.apply(Command::select_attribute("milho"));
    assert_eq!(
        c.events().kinds_for(s.cycle),
        vec![EventKind::Attribute, EventKind::Domain]
    );
}

#[test]
fn attribute_and_domain_follow_the_active_layer() {
    let mut c = controller();
    assert_eq!(c.state().selected_attribute.as_deref(), Some("ANNUAL"));
    assert_eq!(c.state().domain.range(), (5.2, 5.8));
    assert!(c.state().legend().is_some());

    let s = c.apply(Command::select_attribute("JAN"));
    assert_eq!(s.domain.range(), (6.0, 6.4));

    let s = c.apply(Command::toggle("milho"));
    assert_eq!(s.selected_attribute.as_deref(), Some("milho"));
    assert_eq!(s.domain.range(), (10.0, 25.0));

    // Turning the only visible choropleth off leaves no domain.
    let s = c.apply(Command::toggle("milho"));
    assert_eq!(s.selected_attribute, None);
    assert!(!s.domain.has_data());
    assert!(s.legend().is_none());
}

#[test]
fn report_carries_diagnosis_points_and_generation() {
    let mut c = controller();
    c.apply(Command::SetRecommendations(RecommendationTable::from_rows([
        RecommendationRow {
            category: "Milho".into(),
            panel: "Bifacial".into(),
            irrigation: "Pivô central".into(),
        },
    ])));
    let s = c.apply(draw([-1.0, -1.0], [4.0, 2.0]));

    let diagnosis = s.report.diagnosis.as_ref().unwrap();
    assert_eq!(diagnosis.category, "milho");
    assert_eq!(diagnosis.location, "CityB");
    assert_eq!(diagnosis.panel, "Bifacial");

    assert_eq!(s.report.points_of_interest.len(), 1);
    assert_eq!(s.report.points_of_interest[0].name, "Coop Norte");

    let generation = s.report.generation.unwrap();
    assert_abs_diff_eq!(generation.daily_irradiance, 0.0055, epsilon = 1e-12);

    let s = c.apply(Command::ClearSelection);
    assert!(!s.has_selection());
    assert!(s.report.diagnosis.is_none());
    assert!(s.report.generation.is_none());
}

#[test]
fn descriptors_load_from_json() {
    let descriptors: Vec<LayerDescriptor> = serde_json::from_value(serde_json::json!([
        {
            "id": "choropleth-mg",
            "name": "Irradiação",
            "type": "choropleth",
            "features": [{
                "type": "Feature",
                "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]},
                "properties": {"ID": 7, "ANNUAL": 5.1, "NOME": "Uberaba"}
            }]
        },
        {"id": "escolas", "name": "Escolas", "type": "point_icon", "dataset": "urbano"}
    ]))
    .unwrap();

    let mut c = Controller::default();
    let s = c.apply(Command::Load(descriptors));
    assert_eq!(s.registry.len(), 1);
    assert_eq!(s.selected_attribute.as_deref(), Some("ANNUAL"));
    assert_eq!(s.attributes().len(), 1);

    let s = c.apply(draw([0.5, 0.5], [3.0, 3.0]));
    let record = s.aggregates.record(&LayerId::new("choropleth-mg")).unwrap();
    assert_eq!(record.number("ANNUAL"), Some(5.1));
    assert_eq!(record.get("NOME"), Some(&AggregateValue::Context("Uberaba".into())));
}
