//! Grid builder

use crate::grid::boundary_grid::grid::{BoundaryFace, BoundaryGrid};
use crate::types::{BoundaryTag, CouplingError, FaceId, RealScalar, Result};
use ndelement::types::ReferenceCellType;
use std::collections::HashMap;

/// Grid builder for a boundary grid
pub struct BoundaryGridBuilder<const GDIM: usize, T: RealScalar> {
    points: Vec<T>,
    faces: Vec<(FaceId, Vec<usize>, BoundaryTag)>,
    point_indices_to_ids: Vec<usize>,
    point_ids_to_indices: HashMap<usize, usize>,
}

impl<const GDIM: usize, T: RealScalar> BoundaryGridBuilder<GDIM, T> {
    /// Create a new grid builder
    pub fn new() -> Self {
        Self {
            points: vec![],
            faces: vec![],
            point_indices_to_ids: vec![],
            point_ids_to_indices: HashMap::new(),
        }
    }

    /// Create a new grid builder with capacity for a given number of points and faces
    pub fn new_with_capacity(npoints: usize, nfaces: usize) -> Self {
        Self {
            points: Vec::with_capacity(npoints * GDIM),
            faces: Vec::with_capacity(nfaces),
            point_indices_to_ids: Vec::with_capacity(npoints),
            point_ids_to_indices: HashMap::new(),
        }
    }

    /// Add a point to the grid
    pub fn add_point(&mut self, id: usize, data: [T; GDIM]) {
        self.point_ids_to_indices
            .insert(id, self.point_indices_to_ids.len());
        self.point_indices_to_ids.push(id);
        self.points.extend_from_slice(&data);
    }

    /// Add a face to the grid
    ///
    /// The face is given by the ids of its vertices. In 2D a face has two
    /// vertices; in 3D it has three (triangle) or four (quadrilateral, with
    /// the vertices ordered (0, 0), (1, 0), (0, 1), (1, 1) on the reference face).
    pub fn add_face(&mut self, id: FaceId, vertex_ids: &[usize], tag: BoundaryTag) {
        self.faces.push((id, vertex_ids.to_vec(), tag));
    }

    fn face_type(nvertices: usize) -> Option<ReferenceCellType> {
        match (GDIM, nvertices) {
            (2, 2) => Some(ReferenceCellType::Interval),
            (3, 3) => Some(ReferenceCellType::Triangle),
            (3, 4) => Some(ReferenceCellType::Quadrilateral),
            _ => None,
        }
    }

    /// Create the grid
    pub fn create_grid(self) -> Result<BoundaryGrid<GDIM, T>> {
        if GDIM < 2 || GDIM > 3 {
            return Err(CouplingError::ConfigurationMismatch(format!(
                "boundary grids must be embedded in 2D or 3D, not {GDIM}D"
            )));
        }
        if self.point_ids_to_indices.len() != self.point_indices_to_ids.len() {
            return Err(CouplingError::ConfigurationMismatch(
                "point ids must be unique".to_string(),
            ));
        }

        let mut faces = Vec::with_capacity(self.faces.len());
        let mut face_ids_to_indices = HashMap::new();
        for (id, vertex_ids, tag) in self.faces {
            let cell_type = Self::face_type(vertex_ids.len()).ok_or_else(|| {
                CouplingError::ConfigurationMismatch(format!(
                    "face {id} with {} vertices is not a boundary face in {GDIM}D",
                    vertex_ids.len()
                ))
            })?;
            let vertices = vertex_ids
                .iter()
                .map(|v| {
                    self.point_ids_to_indices.get(v).copied().ok_or_else(|| {
                        CouplingError::ConfigurationMismatch(format!(
                            "face {id} refers to unknown point {v}"
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            if face_ids_to_indices.insert(id, faces.len()).is_some() {
                return Err(CouplingError::ConfigurationMismatch(format!(
                    "face id {id} is used twice"
                )));
            }
            faces.push(BoundaryFace {
                id,
                tag,
                cell_type,
                vertices,
            });
        }

        Ok(BoundaryGrid::new(
            self.points,
            faces,
            self.point_indices_to_ids,
            self.point_ids_to_indices,
            face_ids_to_indices,
        ))
    }
}

impl<const GDIM: usize, T: RealScalar> Default for BoundaryGridBuilder<GDIM, T> {
    fn default() -> Self {
        Self::new()
    }
}
