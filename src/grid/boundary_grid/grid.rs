//! Boundary grid

use crate::traits::InterfaceGeometry;
use crate::types::{BoundaryTag, CouplingError, FaceId, RealScalar, Result};
use itertools::izip;
use ndelement::types::ReferenceCellType;
use std::collections::HashMap;

/// A face of a boundary grid
#[derive(Debug, Clone)]
pub struct BoundaryFace {
    pub(crate) id: FaceId,
    pub(crate) tag: BoundaryTag,
    pub(crate) cell_type: ReferenceCellType,
    pub(crate) vertices: Vec<usize>,
}

impl BoundaryFace {
    /// The id of the face
    pub fn id(&self) -> FaceId {
        self.id
    }
    /// The boundary tag of the face
    pub fn tag(&self) -> BoundaryTag {
        self.tag
    }
    /// The reference cell type of the face
    pub fn cell_type(&self) -> ReferenceCellType {
        self.cell_type
    }
    /// The indices of the vertices of the face
    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }
}

/// A grid of the boundary faces of a solver domain.
///
/// Faces are straight intervals in 2D and flat triangles or bilinear
/// quadrilaterals in 3D. A field on the grid is given by its nodal values:
/// `GDIM` components per point, stored point by point in point index order,
/// and is interpolated linearly (bilinearly on quadrilaterals) on each face.
pub struct BoundaryGrid<const GDIM: usize, T: RealScalar> {
    points: Vec<T>,
    faces: Vec<BoundaryFace>,

    point_indices_to_ids: Vec<usize>,
    point_ids_to_indices: HashMap<usize, usize>,
    face_ids_to_indices: HashMap<FaceId, usize>,
}

/// Evaluate the nodal basis functions of a face at a reference point.
fn shape_functions<T: RealScalar>(cell_type: ReferenceCellType, point: &[T], values: &mut [T]) {
    let one = T::one();
    match cell_type {
        ReferenceCellType::Interval => {
            values[0] = one - point[0];
            values[1] = point[0];
        }
        ReferenceCellType::Triangle => {
            values[0] = one - point[0] - point[1];
            values[1] = point[0];
            values[2] = point[1];
        }
        ReferenceCellType::Quadrilateral => {
            values[0] = (one - point[0]) * (one - point[1]);
            values[1] = point[0] * (one - point[1]);
            values[2] = (one - point[0]) * point[1];
            values[3] = point[0] * point[1];
        }
        _ => unreachable!("Boundary faces are intervals, triangles or quadrilaterals"),
    }
}

impl<const GDIM: usize, T: RealScalar> BoundaryGrid<GDIM, T> {
    pub(crate) fn new(
        points: Vec<T>,
        faces: Vec<BoundaryFace>,
        point_indices_to_ids: Vec<usize>,
        point_ids_to_indices: HashMap<usize, usize>,
        face_ids_to_indices: HashMap<FaceId, usize>,
    ) -> Self {
        Self {
            points,
            faces,
            point_indices_to_ids,
            point_ids_to_indices,
            face_ids_to_indices,
        }
    }

    /// The number of points in the grid
    pub fn number_of_points(&self) -> usize {
        self.point_indices_to_ids.len()
    }

    /// The number of faces in the grid
    pub fn number_of_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get the index of a point from its id
    pub fn point_index_from_id(&self, id: usize) -> Option<usize> {
        self.point_ids_to_indices.get(&id).copied()
    }

    /// Get the id of a point from its index
    pub fn point_id_from_index(&self, index: usize) -> usize {
        self.point_indices_to_ids[index]
    }

    /// The coordinates of a point
    pub fn point(&self, index: usize) -> &[T] {
        &self.points[GDIM * index..GDIM * (index + 1)]
    }

    /// Get a face from its id
    pub fn face(&self, id: FaceId) -> Option<&BoundaryFace> {
        self.face_ids_to_indices.get(&id).map(|i| &self.faces[*i])
    }

    /// Iterate over all faces in insertion order
    pub fn iter_faces(&self) -> std::slice::Iter<'_, BoundaryFace> {
        self.faces.iter()
    }

    /// The length of a nodal field on this grid
    pub fn field_size(&self) -> usize {
        GDIM * self.number_of_points()
    }

    /// Create a nodal field by evaluating a function at every point
    pub fn interpolate(&self, f: impl Fn(&[T], &mut [T])) -> Vec<T> {
        let mut field = vec![T::zero(); self.field_size()];
        for (p, value) in self
            .points
            .chunks_exact(GDIM)
            .zip(field.chunks_exact_mut(GDIM))
        {
            f(p, value);
        }
        field
    }

    fn face_from_id(&self, id: FaceId) -> Result<&BoundaryFace> {
        self.face(id).ok_or_else(|| {
            CouplingError::ContractViolation(format!("face {id} is not part of the grid"))
        })
    }

    /// Interpolate nodal data with `GDIM` components per point on a face.
    fn interpolate_on_face(
        &self,
        face: &BoundaryFace,
        reference_points: &[T],
        nodal_data: &[T],
        values: &mut [T],
    ) -> Result<()> {
        let tdim = GDIM - 1;
        if reference_points.len() % tdim != 0 {
            return Err(CouplingError::ContractViolation(format!(
                "{} reference coordinates do not form points of dimension {tdim}",
                reference_points.len()
            )));
        }
        let npoints = reference_points.len() / tdim;
        if values.len() != npoints * GDIM {
            return Err(CouplingError::ContractViolation(format!(
                "output of length {} cannot hold {npoints} points of dimension {GDIM}",
                values.len()
            )));
        }

        let mut basis = vec![T::zero(); face.vertices.len()];
        for (point, value) in izip!(
            reference_points.chunks_exact(tdim),
            values.chunks_exact_mut(GDIM)
        ) {
            shape_functions(face.cell_type, point, &mut basis);
            value.fill(T::zero());
            for (b, v) in basis.iter().zip(&face.vertices) {
                for (out, nodal) in value
                    .iter_mut()
                    .zip(&nodal_data[GDIM * v..GDIM * (v + 1)])
                {
                    *out = *out + *b * *nodal;
                }
            }
        }
        Ok(())
    }
}

/// Iterator over the faces of a boundary grid that carry a tag
pub struct TaggedFaceIter<'a> {
    faces: std::slice::Iter<'a, BoundaryFace>,
    tag: BoundaryTag,
}

impl<'a> Iterator for TaggedFaceIter<'a> {
    type Item = FaceId;

    fn next(&mut self) -> Option<FaceId> {
        let tag = self.tag;
        self.faces.find(|face| face.tag == tag).map(|face| face.id)
    }
}

impl<const GDIM: usize, T: RealScalar> InterfaceGeometry for BoundaryGrid<GDIM, T> {
    type T = T;
    type Field = [T];
    type FaceIter<'a> = TaggedFaceIter<'a>
    where
        Self: 'a;

    fn physical_dimension(&self) -> usize {
        GDIM
    }

    fn interface_faces(&self, tag: BoundaryTag) -> TaggedFaceIter<'_> {
        TaggedFaceIter {
            faces: self.faces.iter(),
            tag,
        }
    }

    /// # Panics
    ///
    /// Panics if `face` is not part of the grid.
    fn face_type(&self, face: FaceId) -> ReferenceCellType {
        self.face(face)
            .expect("Face is not part of the grid")
            .cell_type
    }

    fn map_to_physical(
        &self,
        face: FaceId,
        reference_points: &[T],
        physical_points: &mut [T],
    ) -> Result<()> {
        let face = self.face_from_id(face)?;
        self.interpolate_on_face(face, reference_points, &self.points, physical_points)
    }

    fn evaluate_field(
        &self,
        face: FaceId,
        reference_points: &[T],
        field: &[T],
        values: &mut [T],
    ) -> Result<()> {
        if field.len() != self.field_size() {
            return Err(CouplingError::ContractViolation(format!(
                "field of length {} does not match grid with {} points in {GDIM}D",
                field.len(),
                self.number_of_points()
            )));
        }
        let face = self.face_from_id(face)?;
        self.interpolate_on_face(face, reference_points, field, values)
    }
}
