use approx::*;
use ndcoupling::config::AdapterConfiguration;
use ndcoupling::grid::shapes::{box_surface, flap_boundary};
use ndcoupling::grid::{BoundaryGrid, BoundaryGridBuilder};
use ndcoupling::quadrature::gauss_rule;
use ndcoupling::scripted::{ScriptedService, ServiceCall};
use ndcoupling::time::Time;
use ndcoupling::traits::{CouplingService, TimeSource};
use ndcoupling::types::{Action, DataHandle, Topology};
use ndcoupling::{CouplingError, CouplingSession};
use ndelement::types::ReferenceCellType;
use rand::prelude::*;

fn config() -> AdapterConfiguration {
    let mut config = AdapterConfiguration::default();
    config.set_participant_name("Solid");
    config.set_mesh_name("Solid-Mesh");
    config.set_read_data_name("Stress");
    config.set_write_data_name("Displacement");
    config
}

fn scripted_service(dim: usize, window_size: f64, end_time: f64) -> ScriptedService<f64> {
    let mut service = ScriptedService::new(dim, window_size, end_time);
    let mesh = service.add_mesh("Solid-Mesh");
    service.add_data("Stress", mesh);
    service.add_data("Displacement", mesh);
    service
}

fn session(service: ScriptedService<f64>) -> CouplingSession<ScriptedService<f64>> {
    CouplingSession::new(service, &config(), 1, Topology::SingleRank).unwrap()
}

fn data(session: &CouplingSession<ScriptedService<f64>>, name: &str) -> DataHandle {
    let service = session.service();
    let mesh = service.mesh_handle("Solid-Mesh").unwrap();
    service.data_handle(name, mesh).unwrap()
}

fn writes(service: &ScriptedService<f64>) -> Vec<(i32, Vec<f64>)> {
    service
        .calls()
        .iter()
        .filter_map(|c| match c {
            ServiceCall::WriteVector(_, id, value) => Some((*id, value.clone())),
            _ => None,
        })
        .collect()
}

fn single_face() -> BoundaryGrid<2, f64> {
    let mut b = BoundaryGridBuilder::<2, f64>::new();
    b.add_point(0, [0.0, 0.0]);
    b.add_point(1, [1.0, 0.0]);
    b.add_point(2, [1.0, 1.0]);
    b.add_face(0, &[0, 1], 1);
    b.add_face(1, &[1, 2], 2);
    b.create_grid().unwrap()
}

#[test]
fn test_single_face_constant_field() {
    let grid = single_face();
    let rule = gauss_rule(ReferenceCellType::Interval, 2).unwrap();
    let field = grid.interpolate(|_, v| {
        v[0] = 1.0;
        v[1] = 2.0;
    });

    let mut session = session(scripted_service(2, 1.0, 1.0));
    session.initialize(&grid, &rule, &rule, &field).unwrap();
    assert_eq!(session.write_node_ids().len(), 2);
    assert_eq!(session.read_node_ids().len(), 2);

    session.service_mut().clear_calls();
    session.advance(&grid, &field, 1.0).unwrap();

    let written = writes(session.service());
    assert_eq!(written.len(), 2);
    for ((id, value), expected) in written.iter().zip(session.write_node_ids()) {
        assert_eq!(id, expected);
        assert_relative_eq!(value[0], 1.0, epsilon = 1e-14);
        assert_relative_eq!(value[1], 2.0, epsilon = 1e-14);
    }
    assert!(!session.is_coupling_ongoing());
}

#[test]
fn test_node_counts_and_buffer_length() {
    let grid = box_surface([1.0, 2.0, 1.0], 2, 1);
    let write_rule = gauss_rule(ReferenceCellType::Quadrilateral, 3).unwrap();
    let read_rule = gauss_rule(ReferenceCellType::Quadrilateral, 2).unwrap();
    let field = vec![0.0; grid.field_size()];

    let mut session = session(scripted_service(3, 1.0, 1.0));
    session
        .initialize(&grid, &write_rule, &read_rule, &field)
        .unwrap();

    assert_eq!(session.write_node_ids().len(), 24 * 9);
    assert_eq!(session.read_node_ids().len(), 24 * 4);
    let mesh = session.service().mesh_handle("Solid-Mesh").unwrap();
    assert_eq!(session.service().vertex_count(mesh), 24 * 13);
    assert!(session.read_on_quadrature_point_with_id(24 * 4 - 1).is_ok());
    assert!(matches!(
        session.read_on_quadrature_point_with_id(24 * 4),
        Err(CouplingError::IndexOutOfRange { .. })
    ));
    for face in 0..24 {
        assert_eq!(session.node_offset(face), Some(4 * face));
    }
}

#[test]
fn test_write_initial_data() {
    let grid = flap_boundary(1.0, 2.0, 2, 3, 1, 0);
    let rule = gauss_rule(ReferenceCellType::Interval, 2).unwrap();
    let field = grid.interpolate(|p, v| {
        v[0] = p[0];
        v[1] = p[1];
    });

    let mut service = scripted_service(2, 1.0, 1.0);
    service.set_initial_data_required(true);
    let mut session = session(service);
    session.initialize(&grid, &rule, &rule, &field).unwrap();

    let calls = session
        .service()
        .calls()
        .iter()
        .filter(|c| !matches!(c, ServiceCall::RegisterVertex(..)))
        .cloned()
        .collect::<Vec<_>>();
    let nwrite = session.write_node_ids().len();
    assert_eq!(calls.len(), nwrite + 3);
    assert_eq!(calls[0], ServiceCall::Initialize);
    assert!(calls[1..=nwrite]
        .iter()
        .all(|c| matches!(c, ServiceCall::WriteVector(..))));
    assert_eq!(
        calls[nwrite + 1],
        ServiceCall::MarkActionFulfilled(Action::WriteInitialData)
    );
    assert_eq!(calls[nwrite + 2], ServiceCall::InitializeData);
}

#[test]
fn test_no_initial_data_without_request() {
    let grid = flap_boundary(1.0, 2.0, 2, 3, 1, 0);
    let rule = gauss_rule(ReferenceCellType::Interval, 2).unwrap();
    let field = vec![0.0; grid.field_size()];
    let mut session = session(scripted_service(2, 1.0, 1.0));
    session.initialize(&grid, &rule, &rule, &field).unwrap();
    assert!(writes(session.service()).is_empty());
    assert!(!session
        .service()
        .calls()
        .contains(&ServiceCall::InitializeData));
}

#[test]
fn test_write_not_required() {
    let grid = flap_boundary(1.0, 2.0, 2, 3, 1, 0);
    let rule = gauss_rule(ReferenceCellType::Interval, 2).unwrap();
    let field = vec![1.0; grid.field_size()];
    let mut session = session(scripted_service(2, 0.5, 1.0));
    session.initialize(&grid, &rule, &rule, &field).unwrap();
    let stress = data(&session, "Stress");

    let nodes = session.read_node_ids().to_vec();
    for id in &nodes {
        session
            .service_mut()
            .set_peer_vector(stress, *id, &[*id as f64, -1.0])
            .unwrap();
    }
    session.service_mut().set_write_data_required(Some(false));
    session.service_mut().clear_calls();
    assert_eq!(session.advance(&grid, &field, 0.5).unwrap(), 0.5);

    assert!(writes(session.service()).is_empty());
    assert_eq!(session.service().calls(), &[ServiceCall::Advance(0.5)]);
    for (index, id) in nodes.iter().enumerate() {
        assert_eq!(
            session.read_on_quadrature_point_with_id(index).unwrap(),
            &[*id as f64, -1.0]
        );
    }
}

#[test]
fn test_buffered_reads_match_peer_data() {
    let grid = box_surface([1.0, 1.0, 1.0], 1, 1);
    let rule = gauss_rule(ReferenceCellType::Quadrilateral, 2).unwrap();
    let field = vec![0.0; grid.field_size()];
    let mut session = session(scripted_service(3, 0.1, 1.0));
    session.initialize(&grid, &rule, &rule, &field).unwrap();
    let stress = data(&session, "Stress");

    let mut rng = StdRng::seed_from_u64(0);
    let nodes = session.read_node_ids().to_vec();
    let peer = (0..3 * nodes.len())
        .map(|_| rng.gen::<f64>())
        .collect::<Vec<_>>();
    for (id, value) in nodes.iter().zip(peer.chunks_exact(3)) {
        session
            .service_mut()
            .set_peer_vector(stress, *id, value)
            .unwrap();
    }

    // Values set by the peer are only seen after the next refresh
    assert_eq!(
        session.read_on_quadrature_point_with_id(0).unwrap(),
        &[0.0, 0.0, 0.0]
    );
    session.advance(&grid, &field, 0.1).unwrap();

    for (index, (id, value)) in nodes.iter().zip(peer.chunks_exact(3)).enumerate() {
        assert_eq!(session.read_on_quadrature_point_with_id(index).unwrap(), value);
        let mut direct = [0.0; 3];
        session
            .read_on_quadrature_point(*id, &mut direct)
            .unwrap();
        assert_eq!(&direct, value);
    }
}

#[test]
fn test_write_passes_are_deterministic() {
    let grid = box_surface([1.0, 2.0, 3.0], 2, 1);
    let rule = gauss_rule(ReferenceCellType::Quadrilateral, 2).unwrap();
    let mut rng = StdRng::seed_from_u64(42);
    let field = (0..grid.field_size())
        .map(|_| rng.gen::<f64>())
        .collect::<Vec<_>>();

    let mut session = session(scripted_service(3, 1.0, 2.0));
    session.initialize(&grid, &rule, &rule, &field).unwrap();

    session.service_mut().clear_calls();
    session.advance(&grid, &field, 1.0).unwrap();
    let first = writes(session.service());
    session.service_mut().clear_calls();
    session.advance(&grid, &field, 1.0).unwrap();
    let second = writes(session.service());

    assert_eq!(first.len(), session.write_node_ids().len());
    assert_eq!(first, second);
}

#[test]
fn test_implicit_coupling_with_subcycling() {
    let grid = flap_boundary(1.0, 2.0, 2, 3, 1, 0);
    let rule = gauss_rule(ReferenceCellType::Interval, 2).unwrap();
    let field = vec![0.0; grid.field_size()];

    let mut service = scripted_service(2, 0.5, 1.0);
    service.set_implicit_iterations(2);
    let mut session = session(service);

    let max_dt = session.initialize(&grid, &rule, &rule, &field).unwrap();
    let mut time = Time::new(1.0, max_dt / 2.0);
    let mut displacement = vec![0.0; 2];
    let mut velocity = vec![1.0; 2];
    let mut saved = 0;
    let mut reloaded = 0;

    while session.is_coupling_ongoing() {
        if session
            .save_current_state_if_required(&[&displacement, &velocity], &time)
            .unwrap()
        {
            saved += 1;
        }
        let dt = time.get_delta_t();
        for (u, v) in displacement.iter_mut().zip(velocity.iter_mut()) {
            *u += dt * *v;
            *v += 1.0;
        }
        time.increment();
        session.advance(&grid, &field, dt).unwrap();
        if session
            .reload_old_state_if_required(&mut [&mut displacement, &mut velocity], &mut time)
            .unwrap()
        {
            reloaded += 1;
        }
    }

    assert_eq!(saved, 2);
    assert_eq!(reloaded, 2);
    assert_eq!(time.get_timestep(), 8);
    assert_relative_eq!(time.current(), 1.0);
    assert_relative_eq!(displacement[0], 0.25 * (1.0 + 2.0 + 3.0 + 4.0));
    assert_relative_eq!(velocity[1], 5.0);
    assert_relative_eq!(session.service().time(), 1.0);

    let advances = session
        .service()
        .calls()
        .iter()
        .filter(|c| matches!(c, ServiceCall::Advance(..)))
        .count();
    assert_eq!(advances, 8);
    assert_eq!(
        writes(session.service()).len(),
        4 * session.write_node_ids().len()
    );

    session.finalize().unwrap();
    assert!(session.service().is_finalized());
}

#[test]
fn test_separate_read_and_write_meshes() {
    let grid = flap_boundary(1.0, 2.0, 2, 3, 1, 0);
    let write_rule = gauss_rule(ReferenceCellType::Interval, 3).unwrap();
    let read_rule = gauss_rule(ReferenceCellType::Interval, 1).unwrap();
    let field = vec![0.0; grid.field_size()];

    let mut service = ScriptedService::new(2, 1.0, 1.0);
    let read_mesh = service.add_mesh("Solid-Read");
    let write_mesh = service.add_mesh("Solid-Write");
    service.add_data("Stress", read_mesh);
    service.add_data("Displacement", write_mesh);

    let mut config = AdapterConfiguration::default();
    config.set_read_mesh_name("Solid-Read");
    config.set_write_mesh_name("Solid-Write");
    config.set_read_data_name("Stress");
    config.set_write_data_name("Displacement");
    let mut session: CouplingSession<_> =
        CouplingSession::new(service, &config, 1, Topology::SingleRank).unwrap();
    session
        .initialize(&grid, &write_rule, &read_rule, &field)
        .unwrap();

    assert_eq!(session.service().vertex_count(read_mesh), 8);
    assert_eq!(session.service().vertex_count(write_mesh), 24);
    assert_eq!(session.read_mesh().unwrap().handle(), read_mesh);
    assert_eq!(session.write_mesh().unwrap().handle(), write_mesh);
}

#[test]
fn test_dimension_mismatch() {
    let grid = flap_boundary(1.0, 2.0, 2, 3, 1, 0);
    let rule = gauss_rule(ReferenceCellType::Interval, 2).unwrap();
    let field = vec![0.0; grid.field_size()];
    let mut session = session(scripted_service(3, 1.0, 1.0));
    assert!(matches!(
        session.initialize(&grid, &rule, &rule, &field),
        Err(CouplingError::ConfigurationMismatch(_))
    ));
    assert!(session.read_node_ids().is_empty());
}
