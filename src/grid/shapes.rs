//! Definition of various test shapes.

use crate::grid::{BoundaryGrid, BoundaryGridBuilder};
use crate::types::{BoundaryTag, RealScalar};

/// Create the boundary of a rectangular flap
///
/// The flap occupies `[-width / 2, width / 2] x [0, height]`. The bottom side
/// is split into `nx` faces carrying `clamped_tag`; the left, top and right
/// sides are split into `ny`, `nx` and `ny` faces carrying `interface_tag`.
/// Faces are ordered counterclockwise, starting at the bottom left corner.
pub fn flap_boundary<T: RealScalar>(
    width: T,
    height: T,
    nx: usize,
    ny: usize,
    interface_tag: BoundaryTag,
    clamped_tag: BoundaryTag,
) -> BoundaryGrid<2, T> {
    let npoints = 2 * (nx + ny);
    let mut b = BoundaryGridBuilder::<2, T>::new_with_capacity(npoints, npoints);

    let half = T::from(0.5).unwrap();
    let x0 = -half * width;
    let dx = width / T::from(nx).unwrap();
    let dy = height / T::from(ny).unwrap();

    let mut corners = Vec::with_capacity(npoints);
    for i in 0..nx {
        corners.push([x0 + dx * T::from(i).unwrap(), T::zero()]);
    }
    for j in 0..ny {
        corners.push([x0 + width, dy * T::from(j).unwrap()]);
    }
    for i in 0..nx {
        corners.push([x0 + width - dx * T::from(i).unwrap(), height]);
    }
    for j in 0..ny {
        corners.push([x0, height - dy * T::from(j).unwrap()]);
    }

    for (id, p) in corners.iter().enumerate() {
        b.add_point(id, *p);
    }
    for id in 0..npoints {
        let tag = if id < nx { clamped_tag } else { interface_tag };
        b.add_face(id, &[id, (id + 1) % npoints], tag);
    }
    b.create_grid().unwrap()
}

/// Create the surface of a box
///
/// The box occupies `[0, size[0]] x [0, size[1]] x [0, size[2]]`. Each of its
/// six sides is split into `n * n` quadrilateral faces carrying `tag`. Every
/// side has its own points, so points on the edges of the box are duplicated.
pub fn box_surface<T: RealScalar>(size: [T; 3], n: usize, tag: BoundaryTag) -> BoundaryGrid<3, T> {
    let nside = (n + 1) * (n + 1);
    let mut b = BoundaryGridBuilder::<3, T>::new_with_capacity(6 * nside, 6 * n * n);

    let h = T::one() / T::from(n).unwrap();
    let mut point_n = 0;
    let mut face_n = 0;

    // (normal axis, whether the side lies at the upper end of that axis)
    for (axis, upper) in [(0, false), (0, true), (1, false), (1, true), (2, false), (2, true)] {
        let (t0, t1) = match axis {
            0 => (1, 2),
            1 => (0, 2),
            _ => (0, 1),
        };
        let first_point = point_n;
        for j in 0..=n {
            for i in 0..=n {
                let mut p = [T::zero(); 3];
                p[axis] = if upper { size[axis] } else { T::zero() };
                p[t0] = size[t0] * h * T::from(i).unwrap();
                p[t1] = size[t1] * h * T::from(j).unwrap();
                b.add_point(point_n, p);
                point_n += 1;
            }
        }
        for j in 0..n {
            for i in 0..n {
                let v = first_point + j * (n + 1) + i;
                b.add_face(face_n, &[v, v + 1, v + n + 1, v + n + 2], tag);
                face_n += 1;
            }
        }
    }
    b.create_grid().unwrap()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::traits::InterfaceGeometry;
    use approx::*;

    #[test]
    fn test_flap_boundary() {
        let grid = flap_boundary(1.0, 2.0, 2, 4, 6, 0);
        assert_eq!(grid.number_of_points(), 12);
        assert_eq!(grid.number_of_faces(), 12);
        assert_eq!(grid.interface_faces(0).count(), 2);
        assert_eq!(grid.interface_faces(6).count(), 10);
        assert_eq!(grid.interface_faces(6).next(), Some(2));

        let mut x = vec![0.0; 2];
        grid.map_to_physical(2, &[0.0], &mut x).unwrap();
        assert_relative_eq!(x[0], 0.5);
        assert_relative_eq!(x[1], 0.0);
        grid.map_to_physical(11, &[1.0], &mut x).unwrap();
        assert_relative_eq!(x[0], -0.5);
        assert_relative_eq!(x[1], 0.0);
    }

    #[test]
    fn test_box_surface() {
        let grid = box_surface([1.0, 2.0, 3.0], 2, 1);
        assert_eq!(grid.number_of_faces(), 24);
        assert_eq!(grid.number_of_points(), 54);

        let mut x = vec![0.0; 3];
        for face in grid.interface_faces(1) {
            grid.map_to_physical(face, &[0.5, 0.5], &mut x).unwrap();
            let on_side = (0..3).any(|d| {
                let s = [1.0, 2.0, 3.0][d];
                abs_diff_eq!(x[d], 0.0) || abs_diff_eq!(x[d], s)
            });
            assert!(on_side);
        }
    }
}
