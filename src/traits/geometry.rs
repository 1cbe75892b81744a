//! Definition of the solver geometry seen by the coupling

use crate::types::{BoundaryTag, FaceId, RealScalar, Result};
use ndelement::types::ReferenceCellType;

pub trait InterfaceGeometry {
    //! Boundary geometry and field evaluation of a solver
    //!
    //! Implementations must enumerate faces in the same order on every call
    //! and must keep face ids stable for the lifetime of a coupling session:
    //! node ids are matched to quadrature points purely by enumeration order.

    /// The floating point type used for coordinates and field values
    type T: RealScalar;
    /// The type of a field that can be evaluated on the boundary
    type Field: ?Sized;
    /// The type of the iterator over boundary faces
    type FaceIter<'a>: std::iter::Iterator<Item = FaceId>
    where
        Self: 'a;

    /// The (geometric) dimension of the physical space
    fn physical_dimension(&self) -> usize;

    /// Iterate over the active boundary faces carrying a tag
    fn interface_faces(&self, tag: BoundaryTag) -> Self::FaceIter<'_>;

    /// The reference cell type of a face
    ///
    /// Only faces returned by [`InterfaceGeometry::interface_faces`] need to be
    /// supported; implementations may panic for other ids.
    fn face_type(&self, face: FaceId) -> ReferenceCellType;

    /// Map points on the reference face to physical coordinates
    ///
    /// `physical_points` has length `npoints * physical_dimension`, stored point by point.
    fn map_to_physical(
        &self,
        face: FaceId,
        reference_points: &[Self::T],
        physical_points: &mut [Self::T],
    ) -> Result<()>;

    /// Evaluate a vector-valued field at points on the reference face
    ///
    /// `values` has length `npoints * physical_dimension`, stored point by point
    /// in the same order as the reference points.
    fn evaluate_field(
        &self,
        face: FaceId,
        reference_points: &[Self::T],
        field: &Self::Field,
        values: &mut [Self::T],
    ) -> Result<()>;
}
